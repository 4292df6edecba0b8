//! A render session: the loaded dataset, the year selectors and the redraw
//! policy.
//!
//! Year changes redraw immediately. Resize events are debounced: a burst of
//! resizes yields a single redraw once the quiet period has elapsed. The
//! session does not read any clock, the caller passes the current instant.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::*;
use crate::years::YearSelection;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Fires once after a burst of triggers, when no trigger happened for the
/// quiet period.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    pending_since: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Debouncer {
        Debouncer {
            quiet,
            pending_since: None,
        }
    }

    /// Arms the debouncer, or pushes back the deadline if it is already armed.
    pub fn trigger(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Returns true exactly once per burst, when the quiet period is over.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.quiet => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Debouncer {
        Debouncer::new(DEFAULT_QUIET_PERIOD)
    }
}

#[derive(Debug, Clone)]
pub struct FlowSession {
    records: Vec<DisasterRecord>,
    rules: FlowRules,
    years: YearSelection,
    resize: Debouncer,
    last: RenderOutcome,
    render_count: usize,
}

impl FlowSession {
    /// Loads the records and draws the initial chart over all their years.
    pub fn new(records: Vec<DisasterRecord>, rules: FlowRules) -> Result<FlowSession, FlowErrors> {
        rules.check()?;
        let years = YearSelection::from_records(&records);
        let last = crate::run_flow_aggregation(&records, &rules, years.range())?;
        info!(
            "FlowSession::new: {:?} records, initial range {}",
            records.len(),
            years.range()
        );
        Ok(FlowSession {
            records,
            rules,
            years,
            resize: Debouncer::default(),
            last,
            render_count: 1,
        })
    }

    pub fn with_quiet_period(mut self, quiet: Duration) -> FlowSession {
        self.resize = Debouncer::new(quiet);
        self
    }

    pub fn years(&self) -> &YearSelection {
        &self.years
    }

    pub fn select_start_year(&mut self, year: i32) -> Result<&RenderOutcome, FlowErrors> {
        self.years.select_start(year);
        self.render()
    }

    pub fn select_end_year(&mut self, year: i32) -> Result<&RenderOutcome, FlowErrors> {
        self.years.select_end(year);
        self.render()
    }

    pub fn notify_resize(&mut self, now: Instant) {
        self.resize.trigger(now);
    }

    /// Redraws if a resize burst has settled. Returns the new outcome in that case.
    pub fn poll(&mut self, now: Instant) -> Result<Option<&RenderOutcome>, FlowErrors> {
        if self.resize.ready(now) {
            debug!("poll: resize settled, redrawing");
            self.render().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Rebuilds the chart from scratch for the current selection.
    pub fn render(&mut self) -> Result<&RenderOutcome, FlowErrors> {
        self.last = crate::run_flow_aggregation(&self.records, &self.rules, self.years.range())?;
        self.render_count += 1;
        Ok(&self.last)
    }

    pub fn current(&self) -> &RenderOutcome {
        &self.last
    }

    /// The number of redraws since the session was created, the initial one included.
    pub fn render_count(&self) -> usize {
        self.render_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn sample_records() -> Vec<DisasterRecord> {
        let mut b = Builder::new(&FlowRules::default()).unwrap();
        b.add_record_simple(2010, ["Natural", "Hydrological", "Flood", "Flash flood"], "A")
            .unwrap();
        b.add_record_simple(2015, ["Natural", "Meteorological", "Storm", "Cyclone"], "B")
            .unwrap();
        b.add_record_simple(2018, ["Natural", "Hydrological", "Flood", "Riverine"], "C")
            .unwrap();
        b.records().to_vec()
    }

    #[test]
    fn debouncer_fires_once_per_burst() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        assert!(!d.ready(t0));
        d.trigger(t0);
        d.trigger(t0 + ms(50));
        d.trigger(t0 + ms(120));
        assert!(d.is_pending());
        assert!(!d.ready(t0 + ms(250)));
        assert!(d.ready(t0 + ms(320)));
        assert!(!d.ready(t0 + ms(400)));
        assert!(!d.is_pending());
    }

    #[test]
    fn resize_burst_redraws_once() {
        let t0 = Instant::now();
        let mut s = FlowSession::new(sample_records(), FlowRules::default()).unwrap();
        assert_eq!(s.render_count(), 1);
        for i in 0..10 {
            s.notify_resize(t0 + ms(i * 20));
        }
        assert_eq!(s.poll(t0 + ms(300)).unwrap(), None);
        assert!(s.poll(t0 + ms(380)).unwrap().is_some());
        assert_eq!(s.poll(t0 + ms(1000)).unwrap(), None);
        assert_eq!(s.render_count(), 2);
    }

    #[test]
    fn year_changes_redraw_immediately() {
        let mut s = FlowSession::new(sample_records(), FlowRules::default())
            .unwrap()
            .with_quiet_period(ms(500));
        assert_eq!(s.years().range(), YearRange::new(2010, 2018));
        let total = |o: &RenderOutcome| o.graph().map(|g| g.record_count);
        assert_eq!(total(s.current()), Some(3));

        let o = s.select_start_year(2015).unwrap();
        assert_eq!(total(o), Some(2));
        let o = s.select_end_year(2015).unwrap();
        assert_eq!(total(o), Some(1));
        assert_eq!(s.render_count(), 3);
    }

    #[test]
    fn empty_selection() {
        let mut s = FlowSession::new(sample_records(), FlowRules::default()).unwrap();
        s.select_end_year(2005).unwrap();
        // The start is moved to the first year still allowed: there is none.
        assert_eq!(s.years().range(), YearRange::new(2005, 2005));
        assert_eq!(
            s.current(),
            &RenderOutcome::NoDataInRange(YearRange::new(2005, 2005))
        );
    }

    #[test]
    fn empty_dataset() {
        let s = FlowSession::new(Vec::new(), FlowRules::default()).unwrap();
        assert_eq!(s.current(), &RenderOutcome::MissingDataset);
        assert_eq!(s.years().range(), YearRange::new(1991, 2025));
    }
}

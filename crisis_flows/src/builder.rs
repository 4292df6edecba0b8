pub use crate::config::*;

/// A builder for adding disaster records.
///
/// It is the simplest way to feed records that do not come from a file.
///
/// ```
/// pub use crisis_flows::builder::Builder;
/// pub use crisis_flows::{FlowRules, YearRange};
/// # use crisis_flows::FlowErrors;
///
/// let mut builder = Builder::new(&FlowRules::default())?;
///
/// builder.add_record_simple(2010, ["Natural", "Hydrological", "Flood", "Flash flood"], "Flood A")?;
/// builder.add_record_simple(2010, ["Natural", "Hydrological", "Flood", "Flash flood"], "Flood A")?;
///
/// let outcome = builder.build(YearRange::new(2010, 2010))?;
/// let graph = outcome.graph().unwrap();
/// assert_eq!(graph.nodes.len(), 5);
/// assert!(graph.edges.iter().all(|e| e.value == 2));
///
/// # Ok::<(), FlowErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: FlowRules,
    pub(crate) _records: Vec<DisasterRecord>,
}

impl Builder {
    pub fn new(rules: &FlowRules) -> Result<Builder, FlowErrors> {
        rules.check()?;
        Ok(Builder {
            _rules: rules.clone(),
            _records: Vec::new(),
        })
    }

    /// Adds a record with all its categories.
    ///
    /// categories: group, subgroup, type and subtype, in this order. Empty strings are
    /// treated as missing values.
    pub fn add_record_simple(
        &mut self,
        year: i32,
        categories: [&str; 4],
        event_name: &str,
    ) -> Result<(), FlowErrors> {
        let field = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        let [group, subgroup, disaster_type, subtype] = categories;
        self.add_record(&DisasterRecord {
            year: Some(year),
            group: field(group),
            subgroup: field(subgroup),
            disaster_type: field(disaster_type),
            subtype: field(subtype),
            event_name: field(event_name),
        })
    }

    pub fn add_record(&mut self, record: &DisasterRecord) -> Result<(), FlowErrors> {
        self._records.push(record.clone());
        Ok(())
    }

    pub fn records(&self) -> &[DisasterRecord] {
        &self._records
    }

    pub fn build(&self, range: YearRange) -> Result<RenderOutcome, FlowErrors> {
        crate::run_flow_aggregation(&self._records, &self._rules, range)
    }
}

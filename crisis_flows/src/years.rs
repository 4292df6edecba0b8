//! The start and end year selectors.
//!
//! The two selectors constrain each other: the end options never go below the
//! selected start, and the start options never go above the selected end.

use log::debug;

use crate::config::*;

/// Years at or before this one are treated as bad data.
pub const MIN_VALID_YEAR: i32 = 1900;
pub const DEFAULT_FIRST_YEAR: i32 = 1991;
pub const DEFAULT_LAST_YEAR: i32 = 2025;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct YearSelection {
    // Sorted, distinct.
    years: Vec<i32>,
    start: i32,
    end: i32,
    start_options: Vec<i32>,
    end_options: Vec<i32>,
}

impl YearSelection {
    /// Collects the years present in the records.
    ///
    /// The selection initially covers all of them. Without any valid year it falls
    /// back to 1991 - 2025, with no options.
    pub fn from_records(coll: &[DisasterRecord]) -> YearSelection {
        let mut years: Vec<i32> = coll
            .iter()
            .filter_map(|r| r.year)
            .filter(|y| *y > MIN_VALID_YEAR)
            .collect();
        years.sort_unstable();
        years.dedup();
        let start = years.first().cloned().unwrap_or(DEFAULT_FIRST_YEAR);
        let end = years.last().cloned().unwrap_or(DEFAULT_LAST_YEAR);
        debug!(
            "from_records: {:?} distinct years, selection {} - {}",
            years.len(),
            start,
            end
        );
        YearSelection {
            start_options: years.clone(),
            end_options: years.clone(),
            years,
            start,
            end,
        }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn start_options(&self) -> &[i32] {
        &self.start_options
    }

    pub fn end_options(&self) -> &[i32] {
        &self.end_options
    }

    /// Selects a new start year and restricts the end options accordingly.
    pub fn select_start(&mut self, year: i32) {
        self.start = year;
        self.end_options = self.years.iter().cloned().filter(|y| *y >= year).collect();
        if self.end < year {
            self.end = self.end_options.last().cloned().unwrap_or(year);
        }
        debug!("select_start: {} -> {} - {}", year, self.start, self.end);
    }

    /// Selects a new end year and restricts the start options accordingly.
    pub fn select_end(&mut self, year: i32) {
        self.end = year;
        self.start_options = self.years.iter().cloned().filter(|y| *y <= year).collect();
        if self.start > year {
            self.start = self.start_options.first().cloned().unwrap_or(year);
        }
        debug!("select_end: {} -> {} - {}", year, self.start, self.end);
    }

    pub fn range(&self) -> YearRange {
        YearRange::new(self.start, self.end)
    }
}

use std::path::Path;

use crate::dash::*;

/// A table of text cells, as parsed by the readers.
/// The header row is kept apart. Cells are trimmed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn column_index(&self, column: &str, path: &str) -> DashResult<usize> {
        self.header
            .iter()
            .position(|h| h == column)
            .context(MissingColumnSnafu {
                column,
                path: simplify_file_name(path),
            })
    }
}

// Empty cells are missing values.
fn cell(row: &[String], idx: usize) -> Option<&str> {
    match row.get(idx).map(|s| s.as_str()) {
        Some("") | None => None,
        x => x,
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Reads a year written either as an integer or as a float without fractional part.
pub fn parse_year(s: &str) -> Option<i32> {
    match s.parse::<i32>() {
        Ok(y) => Some(y),
        Err(_) => match s.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f.abs() < (i32::MAX as f64) => Some(f as i32),
            _ => None,
        },
    }
}

pub fn to_disaster_records(
    table: &ParsedTable,
    cfs: &FileSource,
    path: &str,
) -> DashResult<Vec<DisasterRecord>> {
    let cols = cfs.disaster_columns();
    let mut idxs: Vec<usize> = Vec::new();
    for c in cols.iter() {
        idxs.push(table.column_index(c, path)?);
    }
    let mut bad_years: usize = 0;
    let mut res: Vec<DisasterRecord> = Vec::new();
    for row in table.rows.iter() {
        let field = |i: usize| cell(row, idxs[i]).map(|s| s.to_string());
        let year = cell(row, idxs[0]).and_then(parse_year);
        if year.is_none() {
            bad_years += 1;
        }
        res.push(DisasterRecord {
            year,
            group: field(1),
            subgroup: field(2),
            disaster_type: field(3),
            subtype: field(4),
            event_name: field(5),
        });
    }
    if bad_years > 0 {
        warn!(
            "to_disaster_records: {}: {:?} rows without a readable year",
            simplify_file_name(path),
            bad_years
        );
    }
    debug!(
        "to_disaster_records: {}: {:?} records",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

pub fn to_price_observations(
    table: &ParsedTable,
    cfs: &FileSource,
    path: &str,
) -> DashResult<Vec<PriceObservation>> {
    let cols = cfs.price_columns();
    let mut idxs: Vec<usize> = Vec::new();
    for c in cols.iter() {
        idxs.push(table.column_index(c, path)?);
    }
    let res: Vec<PriceObservation> = table
        .rows
        .iter()
        .map(|row| {
            let text = |i: usize| cell(row, idxs[i]).unwrap_or("").to_string();
            PriceObservation {
                commodity: text(0),
                region: text(1),
                price: cell(row, idxs[2])
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(0.0),
                date: text(3),
            }
        })
        .collect();
    debug!(
        "to_price_observations: {}: {:?} observations",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> ParsedTable {
        ParsedTable {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn years() {
        assert_eq!(parse_year("2010"), Some(2010));
        assert_eq!(parse_year("2010.0"), Some(2010));
        assert_eq!(parse_year("2010.5"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn disaster_columns_in_any_order() {
        let t = table(
            &[
                "Event Name",
                "Start Year",
                "Disaster Group",
                "Disaster Subgroup",
                "Disaster Type",
                "Disaster Subtype",
                "Country",
            ],
            &[
                &["Flood A", "2010", "Natural", "Hydrological", "Flood", "Flash flood", "Yemen"],
                &["", "n/a", "Natural", "", "Flood", "", "Yemen"],
            ],
        );
        let cfs = FileSource::new("csv", "disasters.csv");
        let records = to_disaster_records(&t, &cfs, "data/disasters.csv").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(2010));
        assert_eq!(records[0].event_name.as_deref(), Some("Flood A"));
        assert_eq!(records[0].subtype.as_deref(), Some("Flash flood"));
        assert_eq!(records[1].year, None);
        assert_eq!(records[1].subgroup, None);
        assert_eq!(records[1].event_name, None);
    }

    #[test]
    fn missing_column() {
        let t = table(&["Start Year", "Disaster Group"], &[]);
        let cfs = FileSource::new("csv", "disasters.csv");
        match to_disaster_records(&t, &cfs, "data/disasters.csv") {
            Err(DashError::MissingColumn { column, path }) => {
                assert_eq!(column, "Disaster Subgroup");
                assert_eq!(path, "disasters.csv");
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn prices() {
        let t = table(
            &["Commodity", "Admin 1", "Price", "Price Date"],
            &[
                &["Rice", "Aden", "450", "2020-01-15"],
                &["Diesel", "Aden", "n/a", "2020-01-15"],
            ],
        );
        let cfs = FileSource::new("csv", "prices.csv");
        let obs = to_price_observations(&t, &cfs, "prices.csv").unwrap();
        assert_eq!(obs[0].price, 450.0);
        assert_eq!(obs[0].region, "Aden");
        assert_eq!(obs[1].price, 0.0);
    }
}

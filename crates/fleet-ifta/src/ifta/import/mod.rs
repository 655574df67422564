mod normalizer;
mod parser;

pub(crate) use normalizer::normalize_jurisdiction;

use super::domain::{JurisdictionCode, TripLeg};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TripImportError {
    #[error("failed to read trip export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid trip CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("trip export line {line}: {reason}")]
    Row { line: u64, reason: String },
}

/// Reads jurisdiction legs from a `Trip ID,Jurisdiction,Miles,Fuel` export.
///
/// Values are parsed but not judged: negative figures reach the engine, which
/// is the single place that rejects them.
pub struct TripLegImporter;

impl TripLegImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<TripLeg>, TripImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<TripLeg>, TripImportError> {
        let records = parser::parse_records(reader)?;
        let mut legs = Vec::with_capacity(records.len());

        for record in records {
            let line = record.line;
            let jurisdiction = JurisdictionCode::canonical(&record.jurisdiction).map_err(|err| {
                TripImportError::Row {
                    line,
                    reason: err.to_string(),
                }
            })?;
            let miles = parse_quantity(&record.miles, "miles", line)?;
            let fuel = parse_quantity(&record.fuel, "fuel", line)?;

            let mut leg = TripLeg::new(jurisdiction, miles, fuel);
            leg.trip_id = record.trip_id;
            legs.push(leg);
        }

        debug!(legs = legs.len(), "imported trip legs");
        Ok(legs)
    }
}

fn parse_quantity(raw: &str, field: &str, line: u64) -> Result<Decimal, TripImportError> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return Err(TripImportError::Row {
            line,
            reason: format!("{field} is empty"),
        });
    }

    Decimal::from_str(&cleaned).map_err(|err| TripImportError::Row {
        line,
        reason: format!("{field} '{raw}' is not a decimal ({err})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    #[test]
    fn imports_legs_with_normalized_codes() {
        let csv = "Trip ID,Jurisdiction,Miles,Fuel\n\
TRIP-001,ga,250,40\n\
TRIP-001, sc ,150.5,24\n\
,NC,\"1,350\",56.25\n";
        let legs = TripLegImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(legs.len(), 3);
        assert_eq!(legs[0].jurisdiction.as_str(), "GA");
        assert_eq!(legs[0].trip_id.as_deref(), Some("TRIP-001"));
        assert_eq!(legs[1].jurisdiction.as_str(), "SC");
        assert_eq!(legs[1].miles_driven, dec!(150.5));
        assert!(legs[2].trip_id.is_none());
        assert_eq!(legs[2].miles_driven, dec!(1350));
        assert_eq!(legs[2].fuel_purchased, dec!(56.25));
    }

    #[test]
    fn accepts_header_aliases_without_trip_column() {
        let csv = "State,Miles,Fuel Gallons\nFL,300,48\n";
        let legs = TripLegImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].jurisdiction.as_str(), "FL");
        assert_eq!(legs[0].fuel_purchased, dec!(48));
    }

    #[test]
    fn negative_values_pass_through_to_the_engine() {
        let csv = "Jurisdiction,Miles,Fuel\nGA,-10,5\n";
        let legs = TripLegImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        assert_eq!(legs[0].miles_driven, dec!(-10));
    }

    #[test]
    fn reports_line_for_bad_rows() {
        let csv = "Jurisdiction,Miles,Fuel\nGA,250,40\n,100,10\n";
        match TripLegImporter::from_reader(Cursor::new(csv)).expect_err("blank code") {
            TripImportError::Row { line, .. } => assert_eq!(line, 3),
            other => panic!("expected row error, got {other:?}"),
        }

        let csv = "Jurisdiction,Miles,Fuel\nGA,lots,40\n";
        match TripLegImporter::from_reader(Cursor::new(csv)).expect_err("bad miles") {
            TripImportError::Row { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("miles"));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_column_is_a_csv_error() {
        let csv = "Jurisdiction,Miles\nGA,250\n";
        let err = TripLegImporter::from_reader(Cursor::new(csv)).expect_err("missing fuel");
        assert!(matches!(err, TripImportError::Csv(_)));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let err = TripLegImporter::from_path("./does-not-exist.csv").expect_err("io error");
        assert!(matches!(err, TripImportError::Io(_)));
    }
}

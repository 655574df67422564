use super::domain::JurisdictionCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Per-gallon fuel tax rates resolved for a single reporting period.
///
/// A table holds exactly one non-negative rate per jurisdiction. It carries no
/// history: callers pick the table that applies to the quarter being filed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateTable {
    rates: BTreeMap<JurisdictionCode, Decimal>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = (JurisdictionCode, Decimal)>,
    {
        let mut table = Self::new();
        for (jurisdiction, rate) in pairs {
            table.insert(jurisdiction, rate)?;
        }
        Ok(table)
    }

    pub fn insert(
        &mut self,
        jurisdiction: JurisdictionCode,
        rate: Decimal,
    ) -> Result<(), RateTableError> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(RateTableError::NegativeRate { jurisdiction, rate });
        }

        match self.rates.entry(jurisdiction) {
            btree_map::Entry::Occupied(entry) => {
                Err(RateTableError::DuplicateJurisdiction(entry.key().clone()))
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(rate);
                Ok(())
            }
        }
    }

    pub fn rate_for(&self, jurisdiction: &str) -> Option<Decimal> {
        self.rates.get(jurisdiction).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Entries in ascending jurisdiction order.
    pub fn iter(&self) -> impl Iterator<Item = (&JurisdictionCode, Decimal)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    /// Diesel rates (USD per gallon) shipped with the dashboard for 2024 filings.
    pub fn standard_2024() -> Self {
        const RATES_2024: &[(&str, i64, u32)] = &[
            ("AK", 14, 2),
            ("AL", 19, 2),
            ("AR", 2225, 4),
            ("AZ", 19, 2),
            ("CA", 40, 2),
            ("CO", 2025, 4),
            ("CT", 40, 2),
            ("DC", 235, 3),
            ("DE", 22, 2),
            ("FL", 14, 2),
            ("GA", 326, 3),
            ("HI", 19, 2),
            ("IA", 315, 3),
            ("ID", 33, 2),
            ("IL", 454, 3),
            ("IN", 54, 2),
            ("KS", 27, 2),
            ("KY", 236, 3),
            ("LA", 20, 2),
            ("MA", 26, 2),
            ("MD", 36, 2),
            ("ME", 316, 3),
            ("MI", 316, 3),
            ("MN", 286, 3),
            ("MO", 17, 2),
            ("MS", 18, 2),
            ("MT", 278, 3),
            ("NC", 38, 2),
            ("ND", 23, 2),
            ("NE", 295, 3),
            ("NH", 237, 3),
            ("NJ", 415, 3),
            ("NM", 188, 3),
            ("NV", 274, 3),
            ("NY", 45, 2),
            ("OH", 47, 2),
            ("OK", 19, 2),
            ("OR", 38, 2),
            ("PA", 747, 3),
            ("RI", 35, 2),
            ("SC", 22, 2),
            ("SD", 30, 2),
            ("TN", 27, 2),
            ("TX", 20, 2),
            ("UT", 295, 3),
            ("VA", 204, 3),
            ("VT", 30, 2),
            ("WA", 494, 3),
            ("WI", 329, 3),
            ("WV", 356, 3),
            ("WY", 24, 2),
        ];

        let rates = RATES_2024
            .iter()
            .map(|(code, mantissa, scale)| {
                (
                    JurisdictionCode((*code).to_string()),
                    Decimal::new(*mantissa, *scale),
                )
            })
            .collect();

        Self { rates }
    }

    /// Loads a `Jurisdiction,Rate` CSV export.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RateTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::new();

        for (index, row) in csv_reader.deserialize::<RateRow>().enumerate() {
            let row = row?;
            // header occupies line 1
            let line = index as u64 + 2;

            let jurisdiction = JurisdictionCode::canonical(&row.jurisdiction)
                .map_err(|err| RateTableError::InvalidRow {
                    line,
                    reason: err.to_string(),
                })?;
            let rate = Decimal::from_str(row.rate.trim()).map_err(|err| {
                RateTableError::InvalidRow {
                    line,
                    reason: format!("rate '{}' is not a decimal ({err})", row.rate),
                }
            })?;

            table.insert(jurisdiction, rate)?;
        }

        Ok(table)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, RateTableError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }
}

impl<'a> IntoIterator for &'a RateTable {
    type Item = (&'a JurisdictionCode, &'a Decimal);
    type IntoIter = btree_map::Iter<'a, JurisdictionCode, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.rates.iter()
    }
}

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Jurisdiction", alias = "State")]
    jurisdiction: String,
    #[serde(rename = "Rate")]
    rate: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RateTableError {
    #[error("tax rate for {jurisdiction} must not be negative (got {rate})")]
    NegativeRate {
        jurisdiction: JurisdictionCode,
        rate: Decimal,
    },
    #[error("jurisdiction {0} has more than one rate for the period")]
    DuplicateJurisdiction(JurisdictionCode),
    #[error("rate table line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error("failed to read rate table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rate table CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn code(raw: &str) -> JurisdictionCode {
        JurisdictionCode::new(raw).expect("valid code")
    }

    #[test]
    fn standard_table_covers_states_and_dc() {
        let table = RateTable::standard_2024();
        assert_eq!(table.len(), 51);
        assert_eq!(table.rate_for("GA"), Some(dec!(0.326)));
        assert_eq!(table.rate_for("AR"), Some(dec!(0.2225)));
        assert_eq!(table.rate_for("PA"), Some(dec!(0.747)));
        assert_eq!(table.rate_for("ZZ"), None);
    }

    #[test]
    fn iteration_is_ascending_by_code() {
        let table = RateTable::standard_2024();
        let codes: Vec<&str> = table.iter().map(|(code, _)| code.as_str()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn insert_rejects_negative_and_duplicate_rates() {
        let mut table = RateTable::new();
        table.insert(code("GA"), dec!(0.326)).expect("first rate");

        let err = table
            .insert(code("GA"), dec!(0.30))
            .expect_err("duplicate rejected");
        assert!(matches!(err, RateTableError::DuplicateJurisdiction(ref c) if c.as_str() == "GA"));

        let err = table
            .insert(code("SC"), dec!(-0.22))
            .expect_err("negative rejected");
        assert!(matches!(err, RateTableError::NegativeRate { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn zero_rate_is_accepted() {
        let table = RateTable::from_pairs([(code("AK"), Decimal::ZERO)]).expect("zero allowed");
        assert_eq!(table.rate_for("AK"), Some(Decimal::ZERO));
    }

    #[test]
    fn csv_loader_reads_rates_and_uppercases_codes() {
        let csv = "Jurisdiction,Rate\nga,0.326\n SC , 0.22 \nNC,0.38\n";
        let table = RateTable::from_csv_reader(Cursor::new(csv)).expect("csv loads");
        assert_eq!(table.len(), 3);
        assert_eq!(table.rate_for("GA"), Some(dec!(0.326)));
        assert_eq!(table.rate_for("SC"), Some(dec!(0.22)));
    }

    #[test]
    fn csv_loader_reports_line_of_bad_rate() {
        let csv = "Jurisdiction,Rate\nGA,0.326\nSC,abc\n";
        let err = RateTable::from_csv_reader(Cursor::new(csv)).expect_err("bad rate");
        match err {
            RateTableError::InvalidRow { line, .. } => assert_eq!(line, 3),
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn csv_loader_rejects_blank_jurisdiction() {
        let csv = "Jurisdiction,Rate\nGA,0.326\n,0.22\n";
        let err = RateTable::from_csv_reader(Cursor::new(csv)).expect_err("blank code");
        match err {
            RateTableError::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("must not be empty"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn csv_loader_propagates_duplicates() {
        let csv = "State,Rate\nGA,0.326\nGA,0.33\n";
        let err = RateTable::from_csv_reader(Cursor::new(csv)).expect_err("duplicate");
        assert!(matches!(err, RateTableError::DuplicateJurisdiction(_)));
    }

    #[test]
    fn csv_path_propagates_io_errors() {
        let err = RateTable::from_csv_path("./does-not-exist.csv").expect_err("missing file");
        assert!(matches!(err, RateTableError::Io(_)));
    }
}

use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct LegRecord {
    pub(crate) line: u64,
    pub(crate) trip_id: Option<String>,
    pub(crate) jurisdiction: String,
    pub(crate) miles: String,
    pub(crate) fuel: String,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<LegRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: LegRow = record.deserialize(Some(&headers))?;

        records.push(LegRecord {
            line,
            trip_id: row.trip_id,
            jurisdiction: row.jurisdiction,
            miles: row.miles,
            fuel: row.fuel,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct LegRow {
    #[serde(
        rename = "Trip ID",
        alias = "Trip",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    trip_id: Option<String>,
    #[serde(rename = "Jurisdiction", alias = "State")]
    jurisdiction: String,
    #[serde(rename = "Miles")]
    miles: String,
    #[serde(rename = "Fuel", alias = "Fuel Gallons", alias = "Gallons")]
    fuel: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

use chrono::NaiveDate;
use fleet_ifta::error::AppError;
use fleet_ifta::ifta::{JurisdictionCode, RateTable, TripLeg};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) rates: Arc<RateTable>,
}

/// Reads the rate table from `path`, or falls back to the built-in 2024 rates.
pub(crate) fn load_rate_table(path: Option<&Path>) -> Result<RateTable, AppError> {
    match path {
        Some(path) => {
            let table = RateTable::from_csv_path(path)?;
            info!(path = %path.display(), jurisdictions = table.len(), "loaded rate table");
            Ok(table)
        }
        None => Ok(RateTable::standard_2024()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_quantity(raw: &str) -> Result<Decimal, String> {
    let cleaned = raw.trim().replace(',', "");
    Decimal::from_str(&cleaned).map_err(|err| format!("'{raw}' is not a decimal number ({err})"))
}

/// Hand-typed codes are canonicalized so `ga` and `GA` hit the same rate.
pub(crate) fn parse_jurisdiction(raw: &str) -> Result<JurisdictionCode, String> {
    JurisdictionCode::canonical(raw).map_err(|err| err.to_string())
}

pub(crate) fn deserialize_canonical_code<'de, D>(deserializer: D) -> Result<JurisdictionCode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_jurisdiction(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_canonical_legs<'de, D>(deserializer: D) -> Result<Vec<TripLeg>, D::Error>
where
    D: Deserializer<'de>,
{
    let legs = Vec::<TripLeg>::deserialize(deserializer)?;
    legs.into_iter()
        .map(|mut leg| {
            leg.jurisdiction =
                parse_jurisdiction(leg.jurisdiction.as_str()).map_err(serde::de::Error::custom)?;
            Ok(leg)
        })
        .collect()
}

/// Reads a `{ code: rate }` object keeping every entry, so a repeated code
/// reaches `RateTable::from_pairs` and is rejected there instead of being
/// overwritten by the last value.
pub(crate) fn deserialize_rate_overrides<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<(JurisdictionCode, Decimal)>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RateOverrides;

    impl<'de> Visitor<'de> for RateOverrides {
        type Value = Option<Vec<(JurisdictionCode, Decimal)>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object mapping jurisdiction codes to per-gallon rates")
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((raw, rate)) = map.next_entry::<String, Decimal>()? {
                let code = parse_jurisdiction(&raw).map_err(serde::de::Error::custom)?;
                pairs.push((code, rate));
            }
            Ok(Some(pairs))
        }
    }

    deserializer.deserialize_option(RateOverrides)
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

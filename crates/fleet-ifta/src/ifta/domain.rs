use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Short identifier for a taxing jurisdiction (a state or province code).
///
/// The code is opaque to the engine: whether it names a real jurisdiction is
/// decided by the rate table, where a lookup miss is the error signal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JurisdictionCode(pub(crate) String);

impl JurisdictionCode {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyJurisdictionCode> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyJurisdictionCode);
        }

        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Normalizes hand-typed input (BOM stripped, whitespace collapsed,
    /// upper-cased) before building the code.
    pub fn canonical(raw: &str) -> Result<Self, EmptyJurisdictionCode> {
        Self::new(super::import::normalize_jurisdiction(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JurisdictionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for JurisdictionCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JurisdictionCode {
    type Error = EmptyJurisdictionCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for JurisdictionCode {
    type Error = EmptyJurisdictionCode;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JurisdictionCode> for String {
    fn from(value: JurisdictionCode) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("jurisdiction code must not be empty")]
pub struct EmptyJurisdictionCode;

/// One jurisdiction segment of a trip: miles driven there and fuel bought there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLeg {
    pub jurisdiction: JurisdictionCode,
    pub miles_driven: Decimal,
    pub fuel_purchased: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
}

impl TripLeg {
    pub fn new(jurisdiction: JurisdictionCode, miles_driven: Decimal, fuel_purchased: Decimal) -> Self {
        Self {
            jurisdiction,
            miles_driven,
            fuel_purchased,
            trip_id: None,
        }
    }

    pub fn with_trip_id(mut self, trip_id: impl Into<String>) -> Self {
        self.trip_id = Some(trip_id.into());
        self
    }
}

/// Failures raised by the tax computation entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IftaError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("no tax rate configured for jurisdiction {0}")]
    UnknownJurisdiction(JurisdictionCode),
}

/// Reasons a leg set cannot produce a trustworthy report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("at least one trip leg is required")]
    NoLegs,
    #[error("leg {index} ({jurisdiction}) has negative miles: {value}")]
    NegativeMiles {
        index: usize,
        jurisdiction: JurisdictionCode,
        value: Decimal,
    },
    #[error("leg {index} ({jurisdiction}) has negative fuel: {value}")]
    NegativeFuel {
        index: usize,
        jurisdiction: JurisdictionCode,
        value: Decimal,
    },
    #[error("total fuel purchased is zero, so no fleet MPG can be derived")]
    ZeroTotalFuel,
    #[error("arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),
}

pub(crate) fn validate_leg(index: usize, leg: &TripLeg) -> Result<(), InvalidInput> {
    if leg.miles_driven.is_sign_negative() && !leg.miles_driven.is_zero() {
        return Err(InvalidInput::NegativeMiles {
            index,
            jurisdiction: leg.jurisdiction.clone(),
            value: leg.miles_driven,
        });
    }

    if leg.fuel_purchased.is_sign_negative() && !leg.fuel_purchased.is_zero() {
        return Err(InvalidInput::NegativeFuel {
            index,
            jurisdiction: leg.jurisdiction.clone(),
            value: leg.fuel_purchased,
        });
    }

    Ok(())
}

pub(crate) fn checked_sum<'a, I>(values: I, what: &'static str) -> Result<Decimal, InvalidInput>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(*value)
            .ok_or(InvalidInput::ArithmeticOverflow(what))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(raw: &str) -> JurisdictionCode {
        JurisdictionCode::new(raw).expect("valid code")
    }

    #[test]
    fn jurisdiction_code_rejects_blank_values() {
        assert_eq!(JurisdictionCode::new(""), Err(EmptyJurisdictionCode));
        assert_eq!(JurisdictionCode::new("   "), Err(EmptyJurisdictionCode));
        assert_eq!(code(" GA ").as_str(), "GA");
    }

    #[test]
    fn canonical_codes_are_upper_cased_and_cleaned() {
        let parsed = JurisdictionCode::canonical("\u{feff} ga ").expect("canonical code");
        assert_eq!(parsed.as_str(), "GA");
        assert_eq!(JurisdictionCode::canonical("\u{feff}"), Err(EmptyJurisdictionCode));
    }

    #[test]
    fn jurisdiction_code_deserializes_through_validation() {
        let parsed: JurisdictionCode = serde_json::from_str("\"NC\"").expect("parse");
        assert_eq!(parsed, code("NC"));
        assert!(serde_json::from_str::<JurisdictionCode>("\"\"").is_err());
    }

    #[test]
    fn trip_leg_reads_camel_case_json_numbers() {
        let leg: TripLeg = serde_json::from_str(
            r#"{"jurisdiction":"GA","milesDriven":250,"fuelPurchased":40.5}"#,
        )
        .expect("leg parses");
        assert_eq!(leg.jurisdiction, code("GA"));
        assert_eq!(leg.miles_driven, dec!(250));
        assert_eq!(leg.fuel_purchased, dec!(40.5));
        assert!(leg.trip_id.is_none());
    }

    #[test]
    fn validate_leg_flags_negative_fields() {
        let leg = TripLeg::new(code("SC"), dec!(-1), dec!(10));
        assert!(matches!(
            validate_leg(3, &leg),
            Err(InvalidInput::NegativeMiles { index: 3, .. })
        ));

        let leg = TripLeg::new(code("SC"), dec!(1), dec!(-0.5));
        assert!(matches!(
            validate_leg(0, &leg),
            Err(InvalidInput::NegativeFuel { index: 0, .. })
        ));

        let leg = TripLeg::new(code("SC"), dec!(0), dec!(0));
        assert!(validate_leg(0, &leg).is_ok());
    }
}

//! Quick, non-apportioned tax estimates.
//!
//! These figures price fuel at the rate of the jurisdiction it was bought in
//! and ignore where it was burned. They are useful while a trip is being keyed
//! in but are not a filing figure; [`compute_tax_report`](super::compute_tax_report)
//! is the authoritative calculation.

use super::domain::{checked_sum, validate_leg, IftaError, InvalidInput, JurisdictionCode, TripLeg};
use super::rates::RateTable;
use super::report::present;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    Estimate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEstimate {
    pub mode: CalculationMode,
    pub jurisdiction: JurisdictionCode,
    #[serde(with = "rust_decimal::serde::float")]
    pub miles: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fuel: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub mpg: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripEstimate {
    pub mode: CalculationMode,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_miles: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_fuel: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_paid_at_pump: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub mpg: Option<Decimal>,
}

fn mpg(miles: Decimal, fuel: Decimal) -> Option<Decimal> {
    miles.checked_div(fuel).map(present)
}

/// Single-jurisdiction estimate: `fuel × rate`, with MPG when fuel is non-zero.
pub fn estimate_jurisdiction(
    jurisdiction: &JurisdictionCode,
    miles: Decimal,
    fuel: Decimal,
    rates: &RateTable,
) -> Result<QuickEstimate, IftaError> {
    let leg = TripLeg::new(jurisdiction.clone(), miles, fuel);
    validate_leg(0, &leg)?;

    let tax_rate = rates
        .rate_for(jurisdiction.as_str())
        .ok_or_else(|| IftaError::UnknownJurisdiction(jurisdiction.clone()))?;
    let tax = fuel
        .checked_mul(tax_rate)
        .ok_or(InvalidInput::ArithmeticOverflow("estimated tax"))?;

    Ok(QuickEstimate {
        mode: CalculationMode::Estimate,
        jurisdiction: leg.jurisdiction,
        miles,
        fuel,
        tax_rate,
        estimated_tax: present(tax),
        mpg: mpg(miles, fuel),
    })
}

/// Totals for the legs of one trip, pricing each leg's fuel at its own rate.
pub fn estimate_trip(legs: &[TripLeg], rates: &RateTable) -> Result<TripEstimate, IftaError> {
    if legs.is_empty() {
        return Err(InvalidInput::NoLegs.into());
    }

    let mut taxes = Vec::with_capacity(legs.len());
    for (index, leg) in legs.iter().enumerate() {
        validate_leg(index, leg)?;
        let rate = rates
            .rate_for(leg.jurisdiction.as_str())
            .ok_or_else(|| IftaError::UnknownJurisdiction(leg.jurisdiction.clone()))?;
        let tax = leg
            .fuel_purchased
            .checked_mul(rate)
            .ok_or(InvalidInput::ArithmeticOverflow("estimated tax"))?;
        taxes.push(tax);
    }

    let total_miles = checked_sum(legs.iter().map(|leg| &leg.miles_driven), "trip miles")?;
    let total_fuel = checked_sum(legs.iter().map(|leg| &leg.fuel_purchased), "trip fuel")?;
    let tax = checked_sum(&taxes, "trip tax")?;

    Ok(TripEstimate {
        mode: CalculationMode::Estimate,
        total_miles,
        total_fuel,
        tax_paid_at_pump: present(tax),
        mpg: mpg(total_miles, total_fuel),
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
    fn quick_estimate_prices_fuel_at_local_rate() {
        let rates = RateTable::standard_2024();
        let estimate =
            estimate_jurisdiction(&code("GA"), dec!(250), dec!(40), &rates).expect("estimate");

        assert_eq!(estimate.mode, CalculationMode::Estimate);
        assert_eq!(estimate.estimated_tax, dec!(13.04));
        assert_eq!(estimate.mpg, Some(dec!(6.25)));
    }

    #[test]
    fn quick_estimate_without_fuel_has_no_mpg() {
        let rates = RateTable::standard_2024();
        let estimate =
            estimate_jurisdiction(&code("TX"), dec!(120), Decimal::ZERO, &rates).expect("estimate");
        assert!(estimate.estimated_tax.is_zero());
        assert!(estimate.mpg.is_none());
    }

    #[test]
    fn quick_estimate_never_defaults_missing_rates_to_zero() {
        let rates = RateTable::standard_2024();
        let err = estimate_jurisdiction(&code("ZZ"), dec!(10), dec!(1), &rates)
            .expect_err("unknown jurisdiction");
        assert_eq!(err, IftaError::UnknownJurisdiction(code("ZZ")));
    }

    #[test]
    fn trip_estimate_matches_live_calculator_totals() {
        let rates = RateTable::standard_2024();
        let legs = vec![
            TripLeg::new(code("GA"), dec!(250), dec!(40)),
            TripLeg::new(code("SC"), dec!(150), dec!(24)),
            TripLeg::new(code("NC"), dec!(350), dec!(56)),
        ];

        let estimate = estimate_trip(&legs, &rates).expect("estimate");
        assert_eq!(estimate.total_miles, dec!(750));
        assert_eq!(estimate.total_fuel, dec!(120));
        // 13.04 + 5.28 + 21.28
        assert_eq!(estimate.tax_paid_at_pump, dec!(39.60));
        assert_eq!(estimate.mpg, Some(dec!(6.25)));
    }

    #[test]
    fn estimates_reject_negative_quantities() {
        let rates = RateTable::standard_2024();

        let err = estimate_jurisdiction(&code("GA"), dec!(-5), dec!(40), &rates)
            .expect_err("negative miles");
        assert!(matches!(
            err,
            IftaError::InvalidInput(InvalidInput::NegativeMiles { index: 0, .. })
        ));

        let legs = vec![
            TripLeg::new(code("GA"), dec!(250), dec!(40)),
            TripLeg::new(code("SC"), dec!(150), dec!(-2)),
        ];
        let err = estimate_trip(&legs, &rates).expect_err("negative fuel");
        assert!(matches!(
            err,
            IftaError::InvalidInput(InvalidInput::NegativeFuel { index: 1, .. })
        ));
    }

    #[test]
    fn trip_estimate_requires_legs() {
        let rates = RateTable::standard_2024();
        assert_eq!(
            estimate_trip(&[], &rates),
            Err(IftaError::InvalidInput(InvalidInput::NoLegs))
        );
    }
}

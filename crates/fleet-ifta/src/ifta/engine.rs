use super::domain::{checked_sum, validate_leg, IftaError, InvalidInput, JurisdictionCode, TripLeg};
use super::rates::RateTable;
use super::report::{FleetLedger, JurisdictionLedger, TaxReport};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
struct JurisdictionTotals {
    miles: Decimal,
    fuel: Decimal,
}

/// Computes the quarterly IFTA report for a fleet.
///
/// Every precondition is checked before any figure is derived: an empty leg
/// set, negative miles or fuel, zero total fuel, or a jurisdiction missing from
/// `rate_table` fails the whole call and no partial report is produced.
///
/// Consumption is apportioned with one fleet-wide MPG, so a jurisdiction's
/// liability depends on miles driven there, while fuel bought there is credited
/// as tax already paid at the pump. Jurisdictions come back in ascending code
/// order and figures are rounded only once, on the returned report.
pub fn compute_tax_report(
    legs: &[TripLeg],
    rate_table: &RateTable,
    period: impl Into<String>,
) -> Result<TaxReport, IftaError> {
    let period = period.into();

    if legs.is_empty() {
        return Err(InvalidInput::NoLegs.into());
    }

    for (index, leg) in legs.iter().enumerate() {
        validate_leg(index, leg)?;
    }

    let by_jurisdiction = aggregate(legs)?;

    let fleet_miles = checked_sum(by_jurisdiction.values().map(|t| &t.miles), "total miles")?;
    let fleet_fuel = checked_sum(by_jurisdiction.values().map(|t| &t.fuel), "total fuel")?;

    if fleet_fuel.is_zero() {
        return Err(InvalidInput::ZeroTotalFuel.into());
    }

    let rated = by_jurisdiction
        .into_iter()
        .map(|(jurisdiction, totals)| match rate_table.rate_for(jurisdiction.as_str()) {
            Some(rate) => Ok((jurisdiction, totals, rate)),
            None => Err(IftaError::UnknownJurisdiction(jurisdiction)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        period = %period,
        legs = legs.len(),
        jurisdictions = rated.len(),
        "computing IFTA report"
    );

    let average_mpg = fleet_miles
        .checked_div(fleet_fuel)
        .ok_or(InvalidInput::ArithmeticOverflow("average MPG"))?;

    let mut lines = Vec::with_capacity(rated.len());
    for (jurisdiction, totals, tax_rate) in rated {
        lines.push(settle(jurisdiction, totals, tax_rate, fleet_miles, fleet_fuel)?);
    }

    let gross_tax = checked_sum(lines.iter().map(|l| &l.gross_tax), "total gross tax")?;
    let tax_paid = checked_sum(lines.iter().map(|l| &l.tax_paid), "total tax paid")?;
    let due: Vec<Decimal> = lines.iter().map(JurisdictionLedger::tax_due).collect();
    let refunds: Vec<Decimal> = lines.iter().map(JurisdictionLedger::refund_due).collect();
    let tax_due = checked_sum(&due, "total tax due")?;
    let refund_due = checked_sum(&refunds, "total refund due")?;

    let fleet = FleetLedger {
        miles: fleet_miles,
        fuel: fleet_fuel,
        average_mpg,
        gross_tax,
        tax_paid,
        tax_due,
        refund_due,
    };

    Ok(TaxReport::present(period, lines, fleet))
}

fn aggregate(legs: &[TripLeg]) -> Result<BTreeMap<JurisdictionCode, JurisdictionTotals>, InvalidInput> {
    let mut by_jurisdiction: BTreeMap<JurisdictionCode, JurisdictionTotals> = BTreeMap::new();

    for leg in legs {
        let totals = by_jurisdiction.entry(leg.jurisdiction.clone()).or_default();
        totals.miles = totals
            .miles
            .checked_add(leg.miles_driven)
            .ok_or(InvalidInput::ArithmeticOverflow("jurisdiction miles"))?;
        totals.fuel = totals
            .fuel
            .checked_add(leg.fuel_purchased)
            .ok_or(InvalidInput::ArithmeticOverflow("jurisdiction fuel"))?;
    }

    Ok(by_jurisdiction)
}

fn settle(
    jurisdiction: JurisdictionCode,
    totals: JurisdictionTotals,
    tax_rate: Decimal,
    fleet_miles: Decimal,
    fleet_fuel: Decimal,
) -> Result<JurisdictionLedger, InvalidInput> {
    let apportioned_fuel = apportion(totals.miles, fleet_miles, fleet_fuel)?;
    let gross_tax = apportioned_fuel
        .checked_mul(tax_rate)
        .ok_or(InvalidInput::ArithmeticOverflow("gross tax liability"))?;
    let tax_paid = totals
        .fuel
        .checked_mul(tax_rate)
        .ok_or(InvalidInput::ArithmeticOverflow("tax paid at pump"))?;
    let net = gross_tax
        .checked_sub(tax_paid)
        .ok_or(InvalidInput::ArithmeticOverflow("net settlement"))?;

    Ok(JurisdictionLedger {
        jurisdiction,
        miles: totals.miles,
        fuel_purchased: totals.fuel,
        apportioned_fuel,
        tax_rate,
        gross_tax,
        tax_paid,
        net,
    })
}

/// `miles / (fleet_miles / fleet_fuel)`, evaluated as `miles * fleet_fuel / fleet_miles`
/// so the fleet MPG quotient is never itself truncated before reuse.
fn apportion(miles: Decimal, fleet_miles: Decimal, fleet_fuel: Decimal) -> Result<Decimal, InvalidInput> {
    // every jurisdiction has zero miles here, so nothing is consumed anywhere
    if fleet_miles.is_zero() {
        return Ok(Decimal::ZERO);
    }

    miles
        .checked_mul(fleet_fuel)
        .and_then(|scaled| scaled.checked_div(fleet_miles))
        .ok_or(InvalidInput::ArithmeticOverflow("apportioned fuel"))
}

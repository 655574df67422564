use super::super::domain::JurisdictionCode;
use super::super::period::FilingQuarter;
use super::views::{BalanceDirection, JurisdictionSummary, ReportInsights, ReportTotals, TaxReport};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept on presented figures (currency subunits).
pub const PRESENTATION_DECIMALS: u32 = 2;

/// Full-precision settlement for one jurisdiction, before presentation.
#[derive(Debug)]
pub(crate) struct JurisdictionLedger {
    pub(crate) jurisdiction: JurisdictionCode,
    pub(crate) miles: Decimal,
    pub(crate) fuel_purchased: Decimal,
    pub(crate) apportioned_fuel: Decimal,
    pub(crate) tax_rate: Decimal,
    pub(crate) gross_tax: Decimal,
    pub(crate) tax_paid: Decimal,
    pub(crate) net: Decimal,
}

impl JurisdictionLedger {
    pub(crate) fn tax_due(&self) -> Decimal {
        self.net.max(Decimal::ZERO)
    }

    pub(crate) fn refund_due(&self) -> Decimal {
        (-self.net).max(Decimal::ZERO)
    }
}

#[derive(Debug)]
pub(crate) struct FleetLedger {
    pub(crate) miles: Decimal,
    pub(crate) fuel: Decimal,
    pub(crate) average_mpg: Decimal,
    pub(crate) gross_tax: Decimal,
    pub(crate) tax_paid: Decimal,
    pub(crate) tax_due: Decimal,
    pub(crate) refund_due: Decimal,
}

/// Rounds a computed figure to [`PRESENTATION_DECIMALS`], midpoint away from zero.
pub(crate) fn present(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRESENTATION_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

impl TaxReport {
    /// Rounds every computed figure exactly once. Mileage and fuel totals are
    /// caller-supplied sums and pass through untouched, as does the rate.
    pub(crate) fn present(
        period: String,
        lines: Vec<JurisdictionLedger>,
        fleet: FleetLedger,
    ) -> Self {
        let average_mpg = present(fleet.average_mpg);

        let jurisdictions = lines
            .into_iter()
            .map(|line| JurisdictionSummary {
                total_miles: line.miles,
                total_fuel_purchased: line.fuel_purchased,
                average_fleet_mpg: average_mpg,
                apportioned_fuel_consumed: present(line.apportioned_fuel),
                tax_rate: line.tax_rate,
                gross_tax_liability: present(line.gross_tax),
                tax_paid_at_pump: present(line.tax_paid),
                net_amount: present(line.net),
                tax_due: present(line.tax_due()),
                refund_due: present(line.refund_due()),
                jurisdiction: line.jurisdiction,
            })
            .collect();

        let total_tax_due = present(fleet.tax_due);
        let total_refund_due = present(fleet.refund_due);

        Self {
            period,
            jurisdictions,
            totals: ReportTotals {
                total_miles: fleet.miles,
                total_fuel: fleet.fuel,
                average_mpg,
                total_gross_tax: present(fleet.gross_tax),
                total_tax_paid_at_pump: present(fleet.tax_paid),
                total_tax_due,
                total_refund_due,
                // both operands already carry two places, so the identity is exact
                net_balance: total_tax_due - total_refund_due,
            },
        }
    }

    pub fn jurisdiction(&self, code: &str) -> Option<&JurisdictionSummary> {
        self.jurisdictions
            .binary_search_by(|summary| summary.jurisdiction.as_str().cmp(code))
            .ok()
            .map(|index| &self.jurisdictions[index])
    }

    pub fn balance_direction(&self) -> BalanceDirection {
        BalanceDirection::of(self.totals.net_balance)
    }

    pub fn insights(&self, quarter: Option<&FilingQuarter>, today: NaiveDate) -> ReportInsights {
        super::generate_insights(self, quarter, today)
    }
}

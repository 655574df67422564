use super::super::domain::JurisdictionCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settled figures for one jurisdiction of a quarterly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionSummary {
    pub jurisdiction: JurisdictionCode,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_miles: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_fuel_purchased: Decimal,
    #[serde(rename = "averageFleetMPG", with = "rust_decimal::serde::float")]
    pub average_fleet_mpg: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub apportioned_fuel_consumed: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_tax_liability: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_paid_at_pump: Decimal,
    /// Positive when tax is owed, negative when a refund is due.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_due: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub refund_due: Decimal,
}

impl JurisdictionSummary {
    pub fn balance_direction(&self) -> BalanceDirection {
        BalanceDirection::of(self.net_amount)
    }
}

/// Fleet-wide totals. Due and refund amounts are summed separately and never
/// netted against each other before the bottom line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_miles: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_fuel: Decimal,
    #[serde(rename = "averageMPG", with = "rust_decimal::serde::float")]
    pub average_mpg: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_gross_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax_paid_at_pump: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax_due: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_refund_due: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_balance: Decimal,
}

/// Computed quarterly fuel-tax report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReport {
    pub period: String,
    pub jurisdictions: Vec<JurisdictionSummary>,
    pub totals: ReportTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceDirection {
    Due,
    Refund,
    Even,
}

impl BalanceDirection {
    pub fn of(net: Decimal) -> Self {
        if net.is_zero() {
            Self::Even
        } else if net.is_sign_positive() {
            Self::Due
        } else {
            Self::Refund
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Due => "Tax Due",
            Self::Refund => "Refund Due",
            Self::Even => "Even",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportInsights {
    pub compliance_score: u8,
    pub mpg_in_expected_range: bool,
    pub balance_direction: BalanceDirection,
    pub jurisdictions_due: usize,
    pub jurisdictions_refund: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_due: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
}

use super::super::period::FilingQuarter;
use super::views::{BalanceDirection, ReportInsights, TaxReport};
use chrono::NaiveDate;
use rust_decimal::Decimal;

const MIN_PLAUSIBLE_MPG: Decimal = Decimal::from_parts(4, 0, 0, false, 0);
const MAX_PLAUSIBLE_MPG: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const DEADLINE_WARNING_DAYS: i64 = 14;

pub(crate) fn generate_insights(
    report: &TaxReport,
    quarter: Option<&FilingQuarter>,
    today: NaiveDate,
) -> ReportInsights {
    let totals = &report.totals;
    let mut score: i32 = 100;

    // a computed report always has fuel and at least one line, so only
    // mileage and fleet economy can pull the score down
    if totals.total_miles.is_zero() {
        score -= 30;
    }

    let mpg_in_expected_range = (MIN_PLAUSIBLE_MPG..=MAX_PLAUSIBLE_MPG).contains(&totals.average_mpg);
    if !mpg_in_expected_range {
        score -= 15;
    }

    let compliance_score = score.clamp(0, 100) as u8;

    let jurisdictions_due = report
        .jurisdictions
        .iter()
        .filter(|line| line.balance_direction() == BalanceDirection::Due)
        .count();
    let jurisdictions_refund = report
        .jurisdictions
        .iter()
        .filter(|line| line.balance_direction() == BalanceDirection::Refund)
        .count();

    let mut observations = Vec::new();

    if jurisdictions_due > 0 {
        observations.push(format!(
            "{} jurisdiction(s) owe tax totalling ${}",
            jurisdictions_due, totals.total_tax_due
        ));
    }
    if jurisdictions_refund > 0 {
        observations.push(format!(
            "{} jurisdiction(s) are due refunds totalling ${}",
            jurisdictions_refund, totals.total_refund_due
        ));
    }

    if let Some(largest) = report
        .jurisdictions
        .iter()
        .filter(|line| !line.tax_due.is_zero())
        .max_by(|a, b| a.tax_due.cmp(&b.tax_due))
    {
        observations.push(format!(
            "Largest liability: {} (${})",
            largest.jurisdiction, largest.tax_due
        ));
    }

    if !mpg_in_expected_range {
        observations.push(format!(
            "Fleet average of {} MPG is outside the expected {}-{} MPG band; verify odometer and fuel records",
            totals.average_mpg, MIN_PLAUSIBLE_MPG, MAX_PLAUSIBLE_MPG
        ));
    }

    let due_date = quarter.map(FilingQuarter::due_date);
    let days_until_due = quarter.map(|quarter| quarter.days_until_due(today));

    if let (Some(quarter), Some(days)) = (quarter, days_until_due) {
        if days < 0 {
            observations.push(format!(
                "{} return was due {} ({} day(s) ago)",
                quarter,
                quarter.due_date(),
                -days
            ));
        } else if days <= DEADLINE_WARNING_DAYS {
            observations.push(format!(
                "{} return due in {} day(s) on {}",
                quarter,
                days,
                quarter.due_date()
            ));
        }
    }

    ReportInsights {
        compliance_score,
        mpg_in_expected_range,
        balance_direction: report.balance_direction(),
        jurisdictions_due,
        jurisdictions_refund,
        due_date,
        days_until_due,
        observations,
    }
}

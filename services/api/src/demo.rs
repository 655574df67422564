use crate::infra::{load_rate_table, parse_date, parse_jurisdiction, parse_quantity};
use chrono::{Local, NaiveDate};
use clap::Args;
use fleet_ifta::error::AppError;
use fleet_ifta::ifta::{
    compute_tax_report, estimate_jurisdiction, estimate_trip, FilingQuarter, JurisdictionCode,
    QuickEstimate, ReportInsights, TaxReport, TripLeg, TripLegImporter,
};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Trip CSV export (Trip ID,Jurisdiction,Miles,Fuel)
    #[arg(long)]
    pub(crate) legs: PathBuf,
    /// Filing quarter, e.g. Q3-2024
    #[arg(long)]
    pub(crate) period: FilingQuarter,
    /// Rate table CSV (Jurisdiction,Rate). Defaults to the built-in 2024 rates.
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
    /// Evaluation date for deadline insights (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Jurisdiction code, e.g. GA
    #[arg(long, value_parser = parse_jurisdiction)]
    pub(crate) jurisdiction: JurisdictionCode,
    /// Miles driven in the jurisdiction
    #[arg(long, value_parser = parse_quantity)]
    pub(crate) miles: Decimal,
    /// Gallons purchased in the jurisdiction
    #[arg(long, value_parser = parse_quantity)]
    pub(crate) fuel: Decimal,
    /// Rate table CSV (Jurisdiction,Rate)
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RatesArgs {
    /// Only show this jurisdiction
    #[arg(long, value_parser = parse_jurisdiction)]
    pub(crate) jurisdiction: Option<JurisdictionCode>,
    /// Rate table CSV (Jurisdiction,Rate)
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Filing quarter for the sample trips (defaults to Q3-2024)
    #[arg(long)]
    pub(crate) period: Option<FilingQuarter>,
    /// Evaluation date for deadline insights (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_ifta_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        legs,
        period,
        rates,
        today,
        json,
    } = args;

    let table = load_rate_table(rates.as_deref())?;
    let legs = TripLegImporter::from_path(&legs)?;
    let report = compute_tax_report(&legs, &table, period.to_string())?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let insights = report.insights(Some(&period), today);

    if json {
        let body = serde_json::json!({ "report": report, "insights": insights });
        let rendered = serde_json::to_string_pretty(&body).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_report(&report);
        render_insights(&insights);
    }

    Ok(())
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let table = load_rate_table(args.rates.as_deref())?;
    let estimate = estimate_jurisdiction(&args.jurisdiction, args.miles, args.fuel, &table)?;
    render_estimate(&estimate);
    Ok(())
}

pub(crate) fn run_rates(args: RatesArgs) -> Result<(), AppError> {
    let table = load_rate_table(args.rates.as_deref())?;

    match args.jurisdiction {
        Some(code) => match table.rate_for(code.as_str()) {
            Some(rate) => println!("{code}: ${rate}/gal"),
            None => println!("{code}: no rate configured"),
        },
        None => {
            println!("Fuel tax rates ({} jurisdictions)", table.len());
            for (code, rate) in &table {
                println!("- {code}: ${rate}/gal");
            }
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let period = match args.period {
        Some(period) => period,
        None => "Q3-2024".parse::<FilingQuarter>()?,
    };
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let table = load_rate_table(None)?;

    println!("Fleet IFTA demo ({period})");

    let mut all_legs = Vec::new();
    for trip in sample_trips()? {
        let estimate = estimate_trip(&trip.legs, &table)?;
        let route: Vec<&str> = trip
            .legs
            .iter()
            .map(|leg| leg.jurisdiction.as_str())
            .collect();
        println!(
            "- {} {} on {} via {} | {} mi | {} gal | ${:.2} paid at pump{}",
            trip.id,
            trip.truck,
            trip.date,
            route.join(" > "),
            estimate.total_miles,
            estimate.total_fuel,
            estimate.tax_paid_at_pump,
            estimate
                .mpg
                .map(|mpg| format!(" | {mpg} MPG"))
                .unwrap_or_default()
        );
        all_legs.extend(trip.legs);
    }

    let report = compute_tax_report(&all_legs, &table, period.to_string())?;
    println!();
    render_report(&report);
    render_insights(&report.insights(Some(&period), today));
    Ok(())
}

struct SampleTrip {
    id: &'static str,
    truck: &'static str,
    date: &'static str,
    legs: Vec<TripLeg>,
}

fn sample_trips() -> Result<Vec<SampleTrip>, AppError> {
    const TRIPS: &[(&str, &str, &str, &[(&str, i64, i64)])] = &[
        (
            "TRIP-001",
            "TRK-001",
            "2024-09-20",
            &[("GA", 250, 40), ("SC", 150, 24), ("NC", 350, 56)],
        ),
        (
            "TRIP-002",
            "TRK-002",
            "2024-09-21",
            &[("FL", 300, 48), ("GA", 200, 32), ("AL", 150, 30)],
        ),
        (
            "TRIP-003",
            "TRK-003",
            "2024-09-22",
            &[("CA", 400, 65), ("NV", 250, 40), ("AZ", 250, 45)],
        ),
    ];

    TRIPS
        .iter()
        .map(|(id, truck, date, legs)| -> Result<SampleTrip, AppError> {
            let legs = legs
                .iter()
                .map(|(code, miles, fuel)| -> Result<TripLeg, AppError> {
                    let jurisdiction = parse_jurisdiction(code).map_err(|reason| {
                        std::io::Error::new(std::io::ErrorKind::InvalidData, reason)
                    })?;
                    Ok(TripLeg::new(jurisdiction, Decimal::from(*miles), Decimal::from(*fuel))
                        .with_trip_id(*id))
                })
                .collect::<Result<Vec<_>, AppError>>()?;
            Ok(SampleTrip {
                id: *id,
                truck: *truck,
                date: *date,
                legs,
            })
        })
        .collect()
}

fn render_report(report: &TaxReport) {
    println!("IFTA report {}", report.period);
    println!(
        "{:<4} {:>10} {:>10} {:>11} {:>7} {:>10} {:>10} {:>9} {:>9}",
        "Jur", "Miles", "Fuel", "Apportioned", "Rate", "Gross", "Paid", "Due", "Refund"
    );
    for line in &report.jurisdictions {
        println!(
            "{:<4} {:>10} {:>10} {:>11} {:>7} {:>10} {:>10} {:>9} {:>9}",
            line.jurisdiction.as_str(),
            line.total_miles.to_string(),
            line.total_fuel_purchased.to_string(),
            amount(line.apportioned_fuel_consumed),
            line.tax_rate.to_string(),
            amount(line.gross_tax_liability),
            amount(line.tax_paid_at_pump),
            amount(line.tax_due),
            amount(line.refund_due)
        );
    }

    let totals = &report.totals;
    println!(
        "\nFleet: {} mi | {} gal | {} MPG",
        totals.total_miles,
        totals.total_fuel,
        amount(totals.average_mpg)
    );
    println!(
        "Gross ${} | Paid ${} | Due ${} | Refund ${} | Net ${}",
        amount(totals.total_gross_tax),
        amount(totals.total_tax_paid_at_pump),
        amount(totals.total_tax_due),
        amount(totals.total_refund_due),
        amount(totals.net_balance)
    );
}

fn render_insights(insights: &ReportInsights) {
    println!(
        "\nCompliance score: {}% ({})",
        insights.compliance_score,
        insights.balance_direction.label()
    );
    if let (Some(due), Some(days)) = (insights.due_date, insights.days_until_due) {
        println!("Return due {due} ({days} day(s) from today)");
    }

    if !insights.observations.is_empty() {
        println!("\nObservations");
        for note in &insights.observations {
            println!("- {}", note);
        }
    }
}

fn render_estimate(estimate: &QuickEstimate) {
    println!("Estimate only; file from the apportioned report");
    println!(
        "{}: {} mi | {} gal | rate ${}/gal | tax at pump ${}",
        estimate.jurisdiction,
        estimate.miles,
        estimate.fuel,
        estimate.tax_rate,
        amount(estimate.estimated_tax)
    );
    match estimate.mpg {
        Some(mpg) => println!("MPG: {}", amount(mpg)),
        None => println!("MPG: n/a (no fuel purchased)"),
    }
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_ifta::ifta::RateTable;
    use rust_decimal_macros::dec;

    #[test]
    fn sample_trips_cover_eight_jurisdictions() {
        let trips = sample_trips().expect("sample trips build");
        assert_eq!(trips.len(), 3);

        let legs: Vec<TripLeg> = trips.into_iter().flat_map(|trip| trip.legs).collect();
        let report = compute_tax_report(&legs, &RateTable::standard_2024(), "Q3-2024")
            .expect("report computes");

        assert_eq!(report.jurisdictions.len(), 8);
        assert_eq!(report.totals.total_miles, dec!(2300));
        assert_eq!(report.totals.total_fuel, dec!(380));
    }

    #[test]
    fn amounts_render_with_two_places() {
        assert_eq!(amount(dec!(3.8)), "3.80");
        assert_eq!(amount(dec!(-3.26)), "-3.26");
    }
}

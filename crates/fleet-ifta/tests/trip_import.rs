use fleet_ifta::ifta::{compute_tax_report, IftaError, RateTable, TripLegImporter};
use rust_decimal_macros::dec;
use std::io::Cursor;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn quarterly_export_produces_a_filing_report() {
    let legs = TripLegImporter::from_path(fixture("q3_2024_trips.csv")).expect("fixture imports");
    assert_eq!(legs.len(), 9);
    assert_eq!(legs[0].trip_id.as_deref(), Some("TRIP-001"));

    let report = compute_tax_report(&legs, &RateTable::standard_2024(), "Q3-2024")
        .expect("report computes");

    let codes: Vec<&str> = report
        .jurisdictions
        .iter()
        .map(|line| line.jurisdiction.as_str())
        .collect();
    assert_eq!(codes, ["AL", "AZ", "CA", "FL", "GA", "NC", "NV", "SC"]);

    assert_eq!(report.totals.total_miles, dec!(2300));
    assert_eq!(report.totals.total_fuel, dec!(380));
    assert_eq!(report.totals.average_mpg, dec!(6.05));

    // two trips through GA
    let ga = report.jurisdiction("GA").expect("GA present");
    assert_eq!(ga.total_miles, dec!(450));
    assert_eq!(ga.total_fuel_purchased, dec!(72));
    assert_eq!(ga.apportioned_fuel_consumed, dec!(74.35));
    assert_eq!(ga.gross_tax_liability, dec!(24.24));
    assert_eq!(ga.tax_paid_at_pump, dec!(23.47));
    assert_eq!(ga.tax_due, dec!(0.77));

    let ca = report.jurisdiction("CA").expect("CA present");
    assert_eq!(ca.gross_tax_liability, dec!(26.43));
    assert_eq!(ca.tax_due, dec!(0.43));

    let az = report.jurisdiction("AZ").expect("AZ present");
    assert_eq!(az.tax_paid_at_pump, dec!(8.55));
    assert_eq!(az.refund_due, dec!(0.70));
    assert!(az.tax_due.is_zero());
}

#[test]
fn imported_codes_outside_the_rate_table_are_reported() {
    let csv = "Trip ID,Jurisdiction,Miles,Fuel\nT-9,ga,100,20\nT-9,pr,40,0\n";
    let legs = TripLegImporter::from_reader(Cursor::new(csv)).expect("csv imports");

    let err = compute_tax_report(&legs, &RateTable::standard_2024(), "Q1-2025")
        .expect_err("PR has no rate");
    match err {
        IftaError::UnknownJurisdiction(code) => assert_eq!(code.as_str(), "PR"),
        other => panic!("expected unknown jurisdiction, got {other:?}"),
    }
}

#[test]
fn custom_rate_table_overrides_the_built_in_one() {
    let rates_csv = "State,Rate\nga,0.35\nsc,0.25\n";
    let rates = RateTable::from_csv_reader(Cursor::new(rates_csv)).expect("rates load");

    let trips_csv = "Jurisdiction,Miles,Fuel\nGA,300,50\nSC,300,50\n";
    let legs = TripLegImporter::from_reader(Cursor::new(trips_csv)).expect("trips load");

    let report = compute_tax_report(&legs, &rates, "Q1-2025").expect("report computes");
    let ga = report.jurisdiction("GA").expect("GA present");
    assert_eq!(ga.tax_rate, dec!(0.35));
    assert_eq!(ga.gross_tax_liability, dec!(17.50));
    assert!(report.totals.net_balance.is_zero());
}

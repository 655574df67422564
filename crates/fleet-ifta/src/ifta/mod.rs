//! IFTA quarterly fuel-tax computation.

pub mod domain;
mod engine;
pub mod estimate;
pub mod import;
pub mod period;
pub mod rates;
pub mod report;

pub use domain::{IftaError, InvalidInput, JurisdictionCode, TripLeg};
pub use engine::compute_tax_report;
pub use estimate::{estimate_jurisdiction, estimate_trip, QuickEstimate, TripEstimate};
pub use import::{TripImportError, TripLegImporter};
pub use period::{FilingQuarter, PeriodError, Quarter};
pub use rates::{RateTable, RateTableError};
pub use report::{BalanceDirection, JurisdictionSummary, ReportInsights, ReportTotals, TaxReport};

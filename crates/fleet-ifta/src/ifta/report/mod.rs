mod insights;
mod summary;
pub mod views;

pub use summary::PRESENTATION_DECIMALS;
pub use views::{BalanceDirection, JurisdictionSummary, ReportInsights, ReportTotals, TaxReport};

pub(crate) use insights::generate_insights;
pub(crate) use summary::{present, FleetLedger, JurisdictionLedger};

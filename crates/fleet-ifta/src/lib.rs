pub mod config;
pub mod error;
pub mod ifta;
pub mod telemetry;

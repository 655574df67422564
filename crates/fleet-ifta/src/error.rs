use crate::config::ConfigError;
use crate::ifta::{IftaError, PeriodError, RateTableError, TripImportError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Ifta(IftaError),
    Rates(RateTableError),
    Import(TripImportError),
    Period(PeriodError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Ifta(err) => write!(f, "tax computation failed: {}", err),
            AppError::Rates(err) => write!(f, "rate table error: {}", err),
            AppError::Import(err) => write!(f, "trip import error: {}", err),
            AppError::Period(err) => write!(f, "reporting period error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Ifta(err) => Some(err),
            AppError::Rates(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Period(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Ifta(IftaError::UnknownJurisdiction(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Ifta(IftaError::InvalidInput(_))
            | AppError::Rates(_)
            | AppError::Import(_)
            | AppError::Period(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Ifta(IftaError::UnknownJurisdiction(code)) => Json(json!({
                "error": self.to_string(),
                "jurisdiction": code,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<IftaError> for AppError {
    fn from(value: IftaError) -> Self {
        Self::Ifta(value)
    }
}

impl From<RateTableError> for AppError {
    fn from(value: RateTableError) -> Self {
        Self::Rates(value)
    }
}

impl From<TripImportError> for AppError {
    fn from(value: TripImportError) -> Self {
        Self::Import(value)
    }
}

impl From<PeriodError> for AppError {
    fn from(value: PeriodError) -> Self {
        Self::Period(value)
    }
}

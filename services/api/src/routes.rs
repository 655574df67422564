use crate::infra::{
    deserialize_canonical_code, deserialize_canonical_legs, deserialize_optional_date,
    deserialize_rate_overrides, AppState,
};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use fleet_ifta::error::AppError;
use fleet_ifta::ifta::{
    compute_tax_report, estimate_jurisdiction, estimate_trip, FilingQuarter, JurisdictionCode,
    QuickEstimate, RateTable, ReportInsights, TaxReport, TripEstimate, TripLeg,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportRequest {
    pub(crate) period: String,
    #[serde(deserialize_with = "deserialize_canonical_legs")]
    pub(crate) legs: Vec<TripLeg>,
    /// Per-request rates replacing the configured table, in request order.
    #[serde(default, deserialize_with = "deserialize_rate_overrides")]
    pub(crate) rates: Option<Vec<(JurisdictionCode, Decimal)>>,
    #[serde(default)]
    pub(crate) include_insights: bool,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse {
    #[serde(flatten)]
    pub(crate) report: TaxReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) insights: Option<ReportInsights>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EstimateRequest {
    Trip {
        #[serde(deserialize_with = "deserialize_canonical_legs")]
        legs: Vec<TripLeg>,
    },
    Jurisdiction {
        #[serde(deserialize_with = "deserialize_canonical_code")]
        jurisdiction: JurisdictionCode,
        miles: Decimal,
        fuel: Decimal,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum EstimateResponse {
    Trip(TripEstimate),
    Jurisdiction(QuickEstimate),
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RateEntry {
    pub(crate) jurisdiction: JurisdictionCode,
    #[serde(with = "rust_decimal::serde::float")]
    pub(crate) rate: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct RateListing {
    pub(crate) count: usize,
    pub(crate) rates: Vec<RateEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuarterView {
    pub(crate) period: FilingQuarter,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) due_date: NaiveDate,
    pub(crate) days_until_due: i64,
}

impl QuarterView {
    fn new(quarter: FilingQuarter, today: NaiveDate) -> Self {
        Self {
            period: quarter,
            start_date: quarter.start_date(),
            end_date: quarter.end_date(),
            due_date: quarter.due_date(),
            days_until_due: quarter.days_until_due(today),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CurrentQuarterResponse {
    pub(crate) today: NaiveDate,
    pub(crate) current: QuarterView,
    /// The quarter whose return is being prepared while `current` is underway.
    pub(crate) filing: QuarterView,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn ifta_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/ifta/report", post(report_endpoint))
        .route("/api/v1/ifta/estimate", post(estimate_endpoint))
        .route("/api/v1/ifta/rates", get(rates_endpoint))
        .route("/api/v1/ifta/rates/:jurisdiction", get(rate_endpoint))
        .route("/api/v1/ifta/quarters/current", get(current_quarter_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    let ReportRequest {
        period,
        legs,
        rates,
        include_insights,
        today,
    } = payload;

    let override_table = rates.map(RateTable::from_pairs).transpose()?;
    let table = override_table.as_ref().unwrap_or(state.rates.as_ref());

    let report = compute_tax_report(&legs, table, period)?;
    info!(
        period = %report.period,
        legs = legs.len(),
        jurisdictions = report.jurisdictions.len(),
        custom_rates = override_table.is_some(),
        "ifta report computed"
    );

    let insights = if include_insights {
        let today = today.unwrap_or_else(|| Local::now().date_naive());
        let quarter = report.period.parse::<FilingQuarter>().ok();
        Some(report.insights(quarter.as_ref(), today))
    } else {
        None
    };

    Ok(Json(ReportResponse { report, insights }))
}

pub(crate) async fn estimate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let response = match payload {
        EstimateRequest::Trip { legs } => {
            EstimateResponse::Trip(estimate_trip(&legs, &state.rates)?)
        }
        EstimateRequest::Jurisdiction {
            jurisdiction,
            miles,
            fuel,
        } => EstimateResponse::Jurisdiction(estimate_jurisdiction(
            &jurisdiction,
            miles,
            fuel,
            &state.rates,
        )?),
    };
    Ok(Json(response))
}

pub(crate) async fn rates_endpoint(Extension(state): Extension<AppState>) -> Json<RateListing> {
    let rates: Vec<RateEntry> = state
        .rates
        .iter()
        .map(|(jurisdiction, rate)| RateEntry {
            jurisdiction: jurisdiction.clone(),
            rate,
        })
        .collect();

    Json(RateListing {
        count: rates.len(),
        rates,
    })
}

pub(crate) async fn rate_endpoint(
    Extension(state): Extension<AppState>,
    Path(jurisdiction): Path<String>,
) -> Response {
    let code = match JurisdictionCode::canonical(&jurisdiction) {
        Ok(code) => code,
        Err(err) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() })))
                .into_response()
        }
    };
    match state.rates.rate_for(code.as_str()) {
        Some(rate) => Json(RateEntry {
            jurisdiction: code,
            rate,
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("no tax rate configured for jurisdiction {jurisdiction}"),
                "jurisdiction": jurisdiction,
            })),
        )
            .into_response(),
    }
}

pub(crate) async fn current_quarter_endpoint(
    axum::extract::Query(query): axum::extract::Query<TodayQuery>,
) -> Result<Json<CurrentQuarterResponse>, AppError> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let current = FilingQuarter::containing(today)?;
    let filing = current.previous()?;

    Ok(Json(CurrentQuarterResponse {
        today,
        current: QuarterView::new(current, today),
        filing: QuarterView::new(filing, today),
    }))
}

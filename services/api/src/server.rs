use crate::cli::ServeArgs;
use crate::infra::{load_rate_table, AppState};
use crate::routes::ifta_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fleet_ifta::config::AppConfig;
use fleet_ifta::error::AppError;
use fleet_ifta::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let rates = load_rate_table(config.ifta.rate_table_path.as_deref())?;
    let rate_source = match &config.ifta.rate_table_path {
        Some(path) => path.display().to_string(),
        None => "built-in 2024".to_string(),
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        rates: Arc::new(rates),
    };
    let jurisdictions = app_state.rates.len();

    let app = ifta_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rate_source = %rate_source,
        jurisdictions,
        "ifta apportionment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{equity_service, AppState};
use crate::routes::with_equity_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use midwhere_core::config::AppConfig;
use midwhere_core::error::AppError;
use midwhere_core::telemetry;
use std::sync::atomic::Ordering;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = equity_service(&config.equity)?;

    let app = with_equity_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = %config.equity.failure_policy,
        timeout_ms = config.equity.provider_timeout_ms,
        "meeting point service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

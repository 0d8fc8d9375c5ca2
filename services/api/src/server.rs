use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState};
use crate::routes::with_poll_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use pollbox::config::AppConfig;
use pollbox::error::AppError;
use pollbox::polls::{InMemoryRespondentStore, VoteProcessor};
use pollbox::telemetry;
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

    let catalog = Arc::new(load_catalog(&config.polls, Utc::now())?);
    info!(polls = catalog.len(), "poll catalog ready");
    let store = Arc::new(InMemoryRespondentStore::new());
    let processor = Arc::new(VoteProcessor::new(catalog, store));

    let app = with_poll_routes(processor)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "poll voting service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

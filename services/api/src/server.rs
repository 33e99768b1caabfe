use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryScoreRepository};
use crate::routes::with_lkps_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lkps_scoring::config::AppConfig;
use lkps_scoring::error::AppError;
use lkps_scoring::telemetry;
use lkps_scoring::workflows::lkps::LkpsScoringService;
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

    let repository = Arc::new(InMemoryScoreRepository::default());
    let scoring_service = Arc::new(LkpsScoringService::new(repository, config.scoring.clone()));
    let plugin_count = scoring_service.registry().len();

    let app = with_lkps_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, plugins = plugin_count, "lkps scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

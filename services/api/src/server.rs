use crate::cli::ServeArgs;
use crate::infra::{load_rulebook, AppState, InMemoryCompetitionRepository};
use crate::routes::with_competition_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pasanggiri::competition::PasanggiriService;
use pasanggiri::config::AppConfig;
use pasanggiri::error::AppError;
use pasanggiri::telemetry;
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
    if let Some(path) = args.rulebook.take() {
        config.scoring.rulebook_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let rulebook = Arc::new(load_rulebook(config.scoring.rulebook_path.as_deref())?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        rulebook: rulebook.clone(),
    };

    let repository = Arc::new(InMemoryCompetitionRepository::default());
    let service = Arc::new(PasanggiriService::new(repository, rulebook));

    let app = with_competition_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pasanggiri scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

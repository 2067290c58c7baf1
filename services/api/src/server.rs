use crate::cli::ServeArgs;
use crate::infra::{AppState, BranchNameDirectory, InMemoryEvaluationRepository};
use crate::routes::with_evaluation_routes;
use appraisal::config::AppConfig;
use appraisal::error::AppError;
use appraisal::telemetry;
use appraisal::workflows::evaluation::PerformanceReviewService;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    let review_service = Arc::new(PerformanceReviewService::new(
        Arc::new(InMemoryEvaluationRepository::default()),
        Arc::new(BranchNameDirectory),
        config.review.reapproval,
    ));

    let app = with_evaluation_routes(review_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        reapproval = ?config.review.reapproval,
        "performance review service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

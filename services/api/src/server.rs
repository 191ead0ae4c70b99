use crate::cli::ServeArgs;
use crate::demo::sample_household;
use crate::infra::{AppState, InMemoryHouseholdRepository};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use benefit_screener::config::AppConfig;
use benefit_screener::error::AppError;
use benefit_screener::telemetry;
use benefit_screener::workflows::screening::{RepositoryError, ScreeningService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let tables = config.screening.tables()?;
    let repository = Arc::new(InMemoryHouseholdRepository::default());
    if args.seed_demo {
        match repository.insert(sample_household()) {
            Ok(()) | Err(RepositoryError::Conflict) => {}
            Err(err) => warn!(error = %err, "unable to seed sample household"),
        }
    }
    let households = repository.len();
    let service = Arc::new(ScreeningService::new(repository, tables));

    let app = with_screening_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        constants = ?config.screening.constants,
        households,
        %addr,
        "benefit screener ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

use crate::cli::ServeArgs;
use crate::infra::{seed_reference_data, AppState};
use crate::routes::with_accreditation_routes;
use accreditation::config::{AppConfig, StorageBackend};
use accreditation::error::AppError;
use accreditation::storage::{AccreditationStore, MemoryStore, SqliteStore};
use accreditation::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    match config.storage.backend {
        StorageBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            let summary = seed_reference_data(&store)?;
            info!(criteria = summary.inserted, "in-memory store seeded");
            serve_with(store, &config).await
        }
        StorageBackend::Sqlite => {
            let store = Arc::new(SqliteStore::open(&config.storage.database_path)?);
            info!(path = %config.storage.database_path.display(), "sqlite store opened");
            serve_with(store, &config).await
        }
    }
}

async fn serve_with<S>(store: Arc<S>, config: &AppConfig) -> Result<(), AppError>
where
    S: AccreditationStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_accreditation_routes(store, config.scoring)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        criterion_resolution = ?config.scoring.criterion_resolution,
        history = ?config.scoring.history,
        "accreditation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

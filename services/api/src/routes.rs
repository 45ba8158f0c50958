use crate::infra::AppState;
use accreditation::catalog::{catalog_router, CatalogService};
use accreditation::evaluation::{scoring_router, AccreditationService, ScoringPolicy};
use accreditation::reporting::{reports_router, ReportingService};
use accreditation::storage::AccreditationStore;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Catalog, scoring and reporting routers over one store, plus the
/// operational endpoints.
pub(crate) fn with_accreditation_routes<S>(store: Arc<S>, policy: ScoringPolicy) -> Router
where
    S: AccreditationStore + 'static,
{
    let catalog = Arc::new(CatalogService::new(store.clone()));
    let scoring = Arc::new(AccreditationService::new(store.clone(), policy));
    let reporting = Arc::new(ReportingService::new(store));

    catalog_router(catalog)
        .merge(scoring_router(scoring))
        .merge(reports_router(reporting))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

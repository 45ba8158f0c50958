use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::service::ReportingService;
use super::status::StatusCountQuery;
use super::window::DateRange;
use super::ReportingError;
use crate::storage::AccreditationStore;

/// Router exposing the reporting views.
pub fn reports_router<S>(service: Arc<ReportingService<S>>) -> Router
where
    S: AccreditationStore + 'static,
{
    Router::new()
        .route("/api/v1/reports/status-counts", get(status_counts_handler::<S>))
        .route("/api/v1/reports/overview", get(overview_handler::<S>))
        .route("/api/v1/reports/tranches", get(tranches_handler::<S>))
        .route("/api/v1/reports/evolution", get(evolution_handler::<S>))
        .route(
            "/api/v1/reports/registrations",
            get(registrations_handler::<S>),
        )
        .route("/api/v1/reports/provinces", get(provinces_handler::<S>))
        .with_state(service)
}

/// Query string shared by the reporting endpoints. Dates are `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportParams {
    start: Option<String>,
    end: Option<String>,
    #[serde(default)]
    exclude_pending: bool,
    #[serde(default)]
    split_by_type: bool,
}

impl ReportParams {
    fn range(&self) -> Result<Option<DateRange>, ReportingError> {
        DateRange::parse(self.start.as_deref(), self.end.as_deref())
    }
}

impl ReportingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportingError::InvalidDate(_) | ReportingError::InvalidRange { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ReportingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn respond<T: Serialize>(result: Result<T, ReportingError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (error.status_code(), Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_counts_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: AccreditationStore + 'static,
{
    respond(params.range().and_then(|range| {
        service.status_counts(&StatusCountQuery {
            range,
            exclude_pending: params.exclude_pending,
        })
    }))
}

pub(crate) async fn overview_handler<S>(State(service): State<Arc<ReportingService<S>>>) -> Response
where
    S: AccreditationStore + 'static,
{
    respond(service.accreditation_overview())
}

pub(crate) async fn tranches_handler<S>(State(service): State<Arc<ReportingService<S>>>) -> Response
where
    S: AccreditationStore + 'static,
{
    respond(service.score_tranches())
}

pub(crate) async fn evolution_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: AccreditationStore + 'static,
{
    let today = Utc::now().date_naive();
    respond(
        params
            .range()
            .and_then(|range| service.evolution(range, params.split_by_type, today)),
    )
}

pub(crate) async fn registrations_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: AccreditationStore + 'static,
{
    let today = Utc::now().date_naive();
    respond(
        params
            .range()
            .and_then(|range| service.registrations(range, today)),
    )
}

pub(crate) async fn provinces_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
    Query(params): Query<ReportParams>,
) -> Response
where
    S: AccreditationStore + 'static,
{
    respond(params.range().and_then(|range| service.province_rollup(range)))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CriteriaFilter, CriterionId, NewCriterion};
use super::service::{CatalogError, CatalogService};
use crate::facility::FacilityKind;
use crate::storage::CriterionStore;

/// Router exposing catalog listing and administration.
pub fn catalog_router<S>(service: Arc<CatalogService<S>>) -> Router
where
    S: CriterionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/criteria",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/criteria/:criterion_id/deactivate",
            post(deactivate_handler::<S>),
        )
        .route(
            "/api/v1/criteria/:criterion_id/reactivate",
            post(reactivate_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListCriteriaParams {
    #[serde(rename = "type")]
    facility_kind: Option<String>,
    category: Option<String>,
    mandatory: Option<bool>,
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Conflict(_) => StatusCode::CONFLICT,
            CatalogError::Validation(_) | CatalogError::Import(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_response(error: CatalogError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (error.status_code(), Json(payload)).into_response()
}

pub(crate) async fn list_handler<S>(
    State(service): State<Arc<CatalogService<S>>>,
    Query(params): Query<ListCriteriaParams>,
) -> Response
where
    S: CriterionStore + 'static,
{
    let Some(kind) = params.facility_kind.as_deref().and_then(FacilityKind::parse) else {
        return error_response(CatalogError::Validation(
            "query parameter `type` must be ESS or EPVG".into(),
        ));
    };

    let filter = CriteriaFilter {
        category: params.category.filter(|category| !category.trim().is_empty()),
        mandatory: params.mandatory,
    };

    match service.list_criteria(kind, &filter) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<CatalogService<S>>>,
    Json(input): Json<NewCriterion>,
) -> Response
where
    S: CriterionStore + 'static,
{
    match service.create_criterion(input) {
        Ok(criterion) => (StatusCode::CREATED, Json(criterion)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn deactivate_handler<S>(
    State(service): State<Arc<CatalogService<S>>>,
    Path(criterion_id): Path<String>,
) -> Response
where
    S: CriterionStore + 'static,
{
    match service.deactivate_criterion(&CriterionId(criterion_id)) {
        Ok(criterion) => (StatusCode::OK, Json(criterion)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reactivate_handler<S>(
    State(service): State<Arc<CatalogService<S>>>,
    Path(criterion_id): Path<String>,
) -> Response
where
    S: CriterionStore + 'static,
{
    match service.reactivate_criterion(&CriterionId(criterion_id)) {
        Ok(criterion) => (StatusCode::OK, Json(criterion)).into_response(),
        Err(error) => error_response(error),
    }
}

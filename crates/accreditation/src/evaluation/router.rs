use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::domain::ScoreSubmission;
use super::service::{AccreditationService, ScoringError};
use crate::facility::FacilityId;
use crate::storage::AccreditationStore;

/// Router exposing scoring, score lookup, and certificate eligibility.
pub fn scoring_router<S>(service: Arc<AccreditationService<S>>) -> Router
where
    S: AccreditationStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/facilities/:facility_id/score",
            get(score_handler::<S>).post(submit_score_handler::<S>),
        )
        .route(
            "/api/v1/facilities/:facility_id/certificate",
            get(certificate_handler::<S>),
        )
        .with_state(service)
}

impl ScoringError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScoringError::FacilityNotFound(_) | ScoringError::NoConformingEvaluation => {
                StatusCode::NOT_FOUND
            }
            ScoringError::MissingFacilityId | ScoringError::UnknownCriteria(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ScoringError::NotAccredited(_) => StatusCode::FORBIDDEN,
            ScoringError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_response(error: ScoringError) -> Response {
    let payload = match &error {
        ScoringError::UnknownCriteria(ids) => json!({
            "error": error.to_string(),
            "unknown_criterion_ids": ids,
        }),
        _ => json!({ "error": error.to_string() }),
    };
    (error.status_code(), Json(payload)).into_response()
}

pub(crate) async fn submit_score_handler<S>(
    State(service): State<Arc<AccreditationService<S>>>,
    Path(facility_id): Path<String>,
    Json(submission): Json<ScoreSubmission>,
) -> Response
where
    S: AccreditationStore + 'static,
{
    match service.score_facility(&FacilityId(facility_id), &submission) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<S>(
    State(service): State<Arc<AccreditationService<S>>>,
    Path(facility_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
{
    match service.facility_score(&FacilityId(facility_id)) {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn certificate_handler<S>(
    State(service): State<Arc<AccreditationService<S>>>,
    Path(facility_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
{
    let issued_on = Utc::now().date_naive();
    match service.certificate(&FacilityId(facility_id), issued_on) {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(error) => error_response(error),
    }
}

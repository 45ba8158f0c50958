use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::evaluation::{CriterionResolution, HistoryPolicy};

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn submitting_a_score_returns_the_result() {
    let (service, _) = lenient_service();
    let app = scoring_router_with_service(service);

    let response = app
        .oneshot(post_json(
            "/api/v1/facilities/fac-ess-001/score",
            json!({
                "checked_criterion_ids": ["ess-m1", "ess-m2", "ess-m3", "ess-o1"],
                "observations": "visit of 1 March",
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["percentage"], json!(87.5));
    assert_eq!(payload["conforming"], json!(true));
    assert_eq!(payload["accreditation_status"], json!("accredited"));
    assert_eq!(payload["evaluation"]["reference"], json!("EVAL-ESS-001-001"));
}

#[tokio::test]
async fn scoring_an_unknown_facility_is_404() {
    let (service, _) = lenient_service();
    let app = scoring_router_with_service(service);

    let response = app
        .oneshot(post_json(
            "/api/v1/facilities/fac-nowhere/score",
            json!({ "checked_criterion_ids": [] }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn strict_scoring_lists_unknown_ids() {
    let (service, _) = build_service(policy(
        CriterionResolution::Strict,
        HistoryPolicy::Overwrite,
    ));
    let app = scoring_router_with_service(service);

    let response = app
        .oneshot(post_json(
            "/api/v1/facilities/fac-ess-001/score",
            json!({ "checked_criterion_ids": ["ess-m1", "nope"] }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["unknown_criterion_ids"], json!(["nope"]));
}

#[tokio::test]
async fn score_lookup_without_history_is_zero() {
    let (service, _) = lenient_service();
    let app = scoring_router_with_service(service);

    let response = app
        .oneshot(get("/api/v1/facilities/fac-epvg-001/score"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["percentage"], json!(0.0));
    assert_eq!(payload["checked_criterion_ids"], json!([]));
    assert!(payload.get("evaluation").is_none());
}

#[tokio::test]
async fn certificate_for_unaccredited_facility_is_forbidden() {
    let (service, _) = lenient_service();
    let app = scoring_router_with_service(service);

    let response = app
        .oneshot(get("/api/v1/facilities/fac-ess-001/certificate"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("not_accredited"));
}

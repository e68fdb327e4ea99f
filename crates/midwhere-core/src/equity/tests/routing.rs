use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use super::common::*;
use crate::equity::pipeline::{EquityAnalysisPipeline, ProviderFailurePolicy};
use crate::equity::provider::{ProviderError, StraightLineEstimator};
use crate::equity::router::{analyze_handler, equity_router};
use crate::equity::service::{AnalyzeRequest, EquityService, ParticipantInput};

fn request_with_times() -> AnalyzeRequest {
    AnalyzeRequest {
        participants: vec![
            input("ana", 1.30, 103.80, Some("walking"), Some(12.0)),
            input("ben", 1.35, 103.88, Some("driving"), Some(18.0)),
            input("cai", 1.32, 103.94, Some("car"), Some(15.0)),
            input("dee", 1.28, 103.85, Some("bus"), Some(21.0)),
        ],
        departure_time: Some("18:30".to_string()),
    }
}

fn input(
    id: &str,
    lat: f64,
    lng: f64,
    mode: Option<&str>,
    minutes: Option<f64>,
) -> ParticipantInput {
    ParticipantInput {
        id: id.to_string(),
        lat,
        lng,
        mode: mode.map(str::to_string),
        weight: None,
        travel_time_minutes: minutes,
    }
}

fn service_without_provider() -> Arc<EquityService<StraightLineEstimator>> {
    Arc::new(EquityService::new(EquityAnalysisPipeline::default(), None))
}

#[tokio::test]
async fn router_returns_center_and_assessment_together() {
    let app = equity_router(service_without_provider());
    let body = serde_json::to_vec(&request_with_times()).expect("serialize request");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/equity/analyze")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["assessment"]["level"], json!("EXCELLENT"));
    assert_eq!(payload["context"]["sample_size"], json!(4));
    assert_eq!(payload["context"]["time_of_day"], json!("EVENING"));
    assert_eq!(payload["center"]["method"], json!("WEIGHTED_CENTROID"));
    assert!(payload["center"]["center"]["lat"].is_number());
}

#[tokio::test]
async fn unknown_mode_is_unprocessable() {
    let mut request = request_with_times();
    request.participants[1].mode = Some("hoverboard".to_string());

    let response = analyze_handler::<StraightLineEstimator>(
        State(service_without_provider()),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("hoverboard"));
    assert_eq!(payload["retryable"], json!(false));
}

#[tokio::test]
async fn missing_times_without_provider_are_unprocessable() {
    let mut request = request_with_times();
    request.participants[0].travel_time_minutes = None;

    let response = analyze_handler::<StraightLineEstimator>(
        State(service_without_provider()),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn bad_departure_time_is_unprocessable() {
    let mut request = request_with_times();
    request.departure_time = Some("half past six".to_string());

    let response = analyze_handler::<StraightLineEstimator>(
        State(service_without_provider()),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn provider_outage_maps_to_bad_gateway() {
    let provider = ScriptedProvider::new(
        coordinates()
            .into_iter()
            .map(|c| (c, Err(ProviderError::Unavailable("maintenance".to_string()))))
            .collect(),
    );
    let service = Arc::new(EquityService::new(
        pipeline(ProviderFailurePolicy::Strict, 1_000),
        Some(Arc::new(provider)),
    ));

    let mut request = request_with_times();
    for participant in &mut request.participants {
        participant.travel_time_minutes = None;
    }

    let response = analyze_handler::<ScriptedProvider>(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["retryable"], json!(true));
}

#[tokio::test]
async fn estimator_provider_serves_requests_without_times() {
    let service = Arc::new(EquityService::new(
        EquityAnalysisPipeline::default(),
        Some(Arc::new(StraightLineEstimator::default())),
    ));
    let mut request = request_with_times();
    for participant in &mut request.participants {
        participant.travel_time_minutes = None;
    }

    let response =
        analyze_handler::<StraightLineEstimator>(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["samples"][0]["source"], json!("ESTIMATED"));
}

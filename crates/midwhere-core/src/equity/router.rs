use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::error::EquityError;
use super::provider::TravelTimeProvider;
use super::service::{AnalyzeRequest, EquityService};

/// Router builder exposing the equity analysis endpoint.
pub fn equity_router<P>(service: Arc<EquityService<P>>) -> Router
where
    P: TravelTimeProvider + 'static,
{
    Router::new()
        .route("/api/v1/equity/analyze", post(analyze_handler::<P>))
        .with_state(service)
}

pub(crate) async fn analyze_handler<P>(
    State(service): State<Arc<EquityService<P>>>,
    axum::Json(request): axum::Json<AnalyzeRequest>,
) -> Response
where
    P: TravelTimeProvider + 'static,
{
    match service.analyze(request).await {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
                "retryable": error.is_provider(),
            });
            (status_for(&error), axum::Json(payload)).into_response()
        }
    }
}

pub(crate) fn status_for(error: &EquityError) -> StatusCode {
    match error {
        EquityError::ProviderUnavailable { .. } => StatusCode::BAD_GATEWAY,
        EquityError::ProviderTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        EquityError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        EquityError::InvalidInput { .. }
        | EquityError::InsufficientParticipants { .. }
        | EquityError::UnknownMode(_)
        | EquityError::MissingTravelData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

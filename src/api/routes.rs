//! HTTP endpoints: `POST /predict` and `GET /health`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use crate::config::ResponseKeys;
use crate::error::PredictError;
use crate::features::RawRequest;
use crate::inference::RiskPredictor;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<RiskPredictor>,
    pub response_keys: ResponseKeys,
}

/// Build the router with prediction and health routes.
pub fn prediction_routes(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "hepato-risk",
        "preprocessing": state.predictor.preprocessor_name(),
    }))
}

// ── Prediction ──────────────────────────────────────────────────────────

/// The body is parsed by hand so any content type is accepted. Extraction
/// failures (e.g. bodies over axum's default 2 MB limit) keep their status
/// but get a JSON error body.
async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);

    async move {
        let body = match body {
            Ok(body) => body,
            Err(rejection) => {
                warn!(status = rejection.status().as_u16(), "Request body rejected");
                return (
                    rejection.status(),
                    Json(json!({ "error": rejection.body_text() })),
                )
                    .into_response();
            }
        };
        let raw = match parse_body(&body) {
            Ok(raw) => raw,
            Err(e) => return e.into_response(),
        };
        match state.predictor.predict(&raw).await {
            Ok(assessment) => Json(assessment.to_json(state.response_keys)).into_response(),
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

fn parse_body(body: &[u8]) -> Result<RawRequest, PredictError> {
    let required = || PredictError::MalformedRequest("JSON body required".to_string());
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(required()),
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        warn!(status = status.as_u16(), error = %self, "Prediction request failed");

        let body = match self {
            PredictError::MalformedRequest(reason) => json!({ "error": reason }),
            PredictError::MissingFields { missing } => json!({
                "error": "Missing fields in request",
                "missing": missing,
            }),
            PredictError::UnknownCategory { field, value } => json!({
                "error": "Unrecognized category value",
                "field": field,
                "value": value,
            }),
            PredictError::Preprocessing(detail) => json!({
                "error": "Could not apply the preprocessing transform to the input",
                "detail": detail,
            }),
            PredictError::Inference(detail) => json!({
                "error": "Prediction failed",
                "detail": detail,
            }),
            PredictError::OutputFormat(detail) => json!({
                "error": "Unexpected model output format",
                "detail": detail,
            }),
        };
        (status, Json(body)).into_response()
    }
}

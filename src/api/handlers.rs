//! HTTP handlers for the triage API.

use super::types::*;
use super::AppState;
use crate::error::TriageFailure;
use crate::orchestrator::TriageResponse;
use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: "caregate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Triage endpoint: always 200, always an answer.
///
/// The body is read raw so a malformed request degrades to the empty-question
/// fallback path with `reason="request_error"` instead of a 4xx.
pub async fn triage(State(state): State<Arc<AppState>>, body: Bytes) -> Json<TriageResponse> {
    match serde_json::from_slice::<TriageRequest>(&body) {
        Ok(request) => Json(
            state
                .engine
                .handle(&request.question, &request.history, &request.lang)
                .await,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "unparseable triage request");
            Json(
                state
                    .engine
                    .fallback("", &[], &default_lang(), TriageFailure::BadRequest),
            )
        }
    }
}

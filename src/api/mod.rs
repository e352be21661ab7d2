//! Triage API surface.
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /triage - Answer a triage question (always 200)

mod handlers;
mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::orchestrator::TriageEngine;

pub use types::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: TriageEngine,
}

/// Create the API router around a configured engine.
pub fn create_router(engine: TriageEngine) -> Router {
    // The chat widget runs in a browser; keep CORS permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/triage", post(handlers::triage))
        .with_state(Arc::new(AppState { engine }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

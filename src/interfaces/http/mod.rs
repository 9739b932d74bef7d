pub mod handlers;

use crate::application::pipeline::SubmissionPipeline;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
}

pub fn router(pipeline: Arc<SubmissionPipeline>) -> Router {
    Router::new()
        .route("/api/submit", post(handlers::submit))
        .route("/api/check-duplicate", post(handlers::check_duplicate))
        .route("/api/submissions", get(handlers::list_submissions))
        .route("/api/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { pipeline })
}

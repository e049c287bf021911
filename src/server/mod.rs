pub mod error;
pub mod handlers;

use crate::core::analyzer::AnalysisService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::{handle_analyze_pdf, handle_health};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
    /// Upper bound for the whole request body, multipart framing included
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: AnalysisService, max_upload_bytes: usize) -> Self {
        Self {
            service: Arc::new(service),
            max_upload_bytes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/analyze-pdf", post(handle_analyze_pdf))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! Conversion of pipeline failures into HTTP responses

use crate::core::analyzer::StageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for StageError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let category = self.error.category();

        if status.is_server_error() {
            tracing::error!(stage = %self.stage, ?category, "{}", self.error);
        } else {
            tracing::warn!(stage = %self.stage, ?category, "{}", self.error);
        }

        let body = ErrorResponse {
            error: self.error.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

//! HTTP handlers
//!
//! - `POST /api/analyze-pdf`: multipart upload, field `pdf`
//! - `GET /health`

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::analyzer::{Stage, StageError};
use crate::domain::model::{AnalysisResult, UploadedDocument};
use crate::server::AppState;
use crate::utils::error::AnalyzerError;

pub const PDF_FIELD: &str = "pdf";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdf-risk-analyzer",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /api/analyze-pdf
pub async fn handle_analyze_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, StageError> {
    debug!("Starting PDF analysis...");

    let document = read_upload(multipart, state.max_upload_bytes)
        .await
        .map_err(|e| StageError::new(Stage::ReceiveUpload, e))?;

    let result = state.service.analyze(document).await?;

    info!(stage = %Stage::Respond, "Analysis completed");
    Ok(Json(result))
}

async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    limit: usize,
) -> Result<UploadedDocument, AnalyzerError> {
    // a request that is not multipart carries no file at all
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Request is not a multipart upload: {}", rejection);
        AnalyzerError::NoFileUploaded
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, limit))?
    {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }

        // 没有 filename 的 part 是普通表单字段，不算文件
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!("Field '{}' has no filename, skipping", PDF_FIELD);
            continue;
        };
        if filename.is_empty() {
            return Err(AnalyzerError::NoFileSelected);
        }

        let bytes = field.bytes().await.map_err(|e| upload_error(e, limit))?;
        return Ok(UploadedDocument::new(filename, bytes.to_vec()));
    }

    Err(AnalyzerError::NoFileUploaded)
}

fn upload_error(err: MultipartError, limit: usize) -> AnalyzerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AnalyzerError::UploadTooLarge { limit }
    } else {
        AnalyzerError::UploadError {
            message: err.body_text(),
        }
    }
}

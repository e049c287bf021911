#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use httpmock::Mock;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_risk_analyzer::adapters::{AnthropicClient, LopdfExtractor};
use pdf_risk_analyzer::domain::ports::TemplateStore;
use pdf_risk_analyzer::server::{self, AppState};
use pdf_risk_analyzer::{AnalysisService, AnalysisSettings, ServiceConfig};
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "X-PDF-RISK-BOUNDARY";

/// Builds a PDF with one page per entry; empty entries produce blank pages.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page_text in pages {
        let operations = if page_text.is_empty() {
            vec![]
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*page_text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A multipart body with a single file part.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze-pdf")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn pdf_upload(pages: &[&str]) -> Request<Body> {
    upload_request(multipart_body("pdf", "report.pdf", &build_pdf(pages)))
}

pub fn test_config(server: &MockServer, api_key: Option<&str>) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.provider.api_base_url = server.base_url();
    config.anthropic_api_key = api_key.map(str::to_string);
    config
}

pub fn test_router(config: &ServiceConfig, store: impl TemplateStore + 'static) -> Router {
    let service = AnalysisService::new(
        Arc::new(LopdfExtractor::new()),
        Arc::new(store),
        Arc::new(AnthropicClient::from_config(config)),
        AnalysisSettings::from_config(config),
    );
    server::router(AppState::new(service, config.server.max_upload_bytes))
}

/// Mocks the Messages API so that it answers with `reply` as the text block.
pub fn mock_provider<'a>(server: &'a MockServer, reply: &str) -> Mock<'a> {
    let body = serde_json::json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": reply}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 20}
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

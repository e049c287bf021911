//! Anthropic Messages API client.
//!
//! One request per call, no retries.

use crate::config::ServiceConfig;
use crate::domain::ports::AnalysisClient;
use crate::utils::error::{AnalyzerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    api_version: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.anthropic_api_key.clone(),
            endpoint: format!(
                "{}/v1/messages",
                config.provider.api_base_url.trim_end_matches('/')
            ),
            api_version: config.provider.api_version.clone(),
            model: config.provider.model.clone(),
            max_tokens: config.provider.max_tokens,
        }
    }
}

pub fn user_prompt(document_text: &str) -> String {
    format!(
        "Analyze this document and provide the results in JSON format:\n\n{}",
        document_text
    )
}

#[async_trait]
impl AnalysisClient for AnthropicClient {
    async fn analyze(&self, system_prompt: &str, document_text: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("Anthropic API key not found in environment");
            AnalyzerError::ProviderAuthError
        })?;

        let prompt = user_prompt(document_text);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };

        tracing::debug!("Sending request to Anthropic API: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Anthropic API response status: {}", status);

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!("Failed to read Anthropic error body: {}", e);
                    String::new()
                }
            };
            let detail = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => format!(
                    "{} ({}): {}",
                    status, envelope.error.kind, envelope.error.message
                ),
                Err(_) => format!("{}: {}", status, body),
            };
            return Err(AnalyzerError::provider(detail));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::provider(format!("Invalid response envelope: {}", e)))?;

        let block = reply
            .content
            .into_iter()
            .next()
            .ok_or_else(|| AnalyzerError::provider("Empty response from Anthropic API"))?;

        let text = block.text.ok_or_else(|| {
            tracing::error!("Unexpected content block type: {:?}", block.kind);
            AnalyzerError::provider("Unexpected response format - no text field")
        })?;

        tracing::debug!("Raw response text: {}", text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, api_key: Option<&str>) -> AnthropicClient {
        let mut config = ServiceConfig::default();
        config.provider.api_base_url = server.base_url();
        config.anthropic_api_key = api_key.map(str::to_string);
        AnthropicClient::from_config(&config)
    }

    #[tokio::test]
    async fn test_returns_first_text_block() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "test-key")
                .header("anthropic-version", "2023-06-01")
                .json_body_partial(
                    r#"{"model":"claude-3-5-sonnet-20241022","max_tokens":2048,"system":"be terse"}"#,
                );
            then.status(200).json_body(json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "{\"summary\":\"ok\"}"}],
                "stop_reason": "end_turn"
            }));
        });

        let reply = client_for(&server, Some("test-key"))
            .analyze("be terse", "document body")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(reply, "{\"summary\":\"ok\"}");
    }

    #[tokio::test]
    async fn test_user_prompt_wraps_document_text() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .body_contains("Analyze this document and provide the results in JSON format:")
                .body_contains("Lease term is 12 months");
            then.status(200)
                .json_body(json!({"content": [{"type": "text", "text": "{}"}]}));
        });

        client_for(&server, Some("k"))
            .analyze("system", "Lease term is 12 months")
            .await
            .unwrap();

        api_mock.assert();
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200);
        });

        let err = client_for(&server, None)
            .analyze("system", "text")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::ProviderAuthError));
        api_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_error_status_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(401).json_body(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            }));
        });

        let err = client_for(&server, Some("bad"))
            .analyze("system", "text")
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("AI service error: "));
        assert!(message.contains("authentication_error"));
        assert!(message.contains("invalid x-api-key"));
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(502).body("upstream gateway down");
        });

        let err = client_for(&server, Some("k"))
            .analyze("system", "text")
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("AI service error: 502"));
        assert!(message.contains("upstream gateway down"));
    }

    #[tokio::test]
    async fn test_empty_content_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({"content": []}));
        });

        let err = client_for(&server, Some("k"))
            .analyze("system", "text")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "AI service error: Empty response from Anthropic API"
        );
    }

    #[tokio::test]
    async fn test_block_without_text_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({
                "content": [{"type": "tool_use", "id": "t1", "name": "x", "input": {}}]
            }));
        });

        let err = client_for(&server, Some("k"))
            .analyze("system", "text")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "AI service error: Unexpected response format - no text field"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_provider_error() {
        let mut config = ServiceConfig::default();
        config.provider.api_base_url = "http://127.0.0.1:1".to_string();
        config.anthropic_api_key = Some("k".to_string());

        let err = AnthropicClient::from_config(&config)
            .analyze("system", "text")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::ProviderError { .. }));
    }
}

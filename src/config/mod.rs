#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_database_url, validate_non_empty_string, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_TEMPLATE_NAME: &str = "pdf_risk_analysis";

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub templates: TemplateConfig,

    /// Connection string for the template store (`DATABASE_URL`).
    #[serde(skip_serializing)]
    pub database_url: Option<String>,

    /// Provider credential (`ANTHROPIC_API_KEY`).
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_base_url: String,
    pub api_version: String,
    pub model: String,
    pub max_tokens: u32,
    /// Extracted text beyond this many characters is truncated before sending.
    pub max_document_chars: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2048,
            max_document_chars: 400_000,
        }
    }
}

/// Where the system prompt comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSource {
    /// Built-in prompt; the stored template is fetched and logged only.
    #[default]
    Builtin,
    /// Stored template is the system prompt and must exist.
    Store,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub name: String,
    pub source: PromptSource,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            source: PromptSource::Builtin,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// 以環境變數覆蓋設定（環境變數優先於設定檔）
    pub fn apply_env(&mut self) {
        if let Some(url) = non_empty_var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(key) = non_empty_var("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        if let Some(base_url) = non_empty_var("ANTHROPIC_API_URL") {
            self.provider.api_base_url = base_url;
        }
        if let Some(model) = non_empty_var("ANALYZER_MODEL") {
            self.provider.model = model;
        }
        if let Some(port) = non_empty_var("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

// Secrets never reach the logs.
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("server", &self.server)
            .field("provider", &self.provider)
            .field("templates", &self.templates)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "<set>"),
            )
            .finish()
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_positive_number("server.max_upload_bytes", self.server.max_upload_bytes, 1)?;

        validate_url("provider.api_base_url", &self.provider.api_base_url)?;
        validate_non_empty_string("provider.api_version", &self.provider.api_version)?;
        validate_non_empty_string("provider.model", &self.provider.model)?;
        validate_range("provider.max_tokens", self.provider.max_tokens, 1, 8192)?;
        validate_positive_number(
            "provider.max_document_chars",
            self.provider.max_document_chars,
            1,
        )?;

        validate_non_empty_string("templates.name", &self.templates.name)?;
        validate_range("templates.max_connections", self.templates.max_connections, 1, 100)?;
        validate_range(
            "templates.acquire_timeout_secs",
            self.templates.acquire_timeout_secs,
            1,
            300,
        )?;

        if let Some(url) = &self.database_url {
            validate_database_url("DATABASE_URL", url)?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

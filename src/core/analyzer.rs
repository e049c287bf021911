use crate::config::{PromptSource, ServiceConfig};
use crate::core::validator::ResponseValidator;
use crate::domain::model::{AnalysisResult, UploadedDocument};
use crate::domain::ports::{AnalysisClient, TemplateStore, TextExtractor};
use crate::utils::error::{AnalyzerError, Result};
use std::fmt;
use std::sync::Arc;

pub const SYSTEM_PROMPT: &str = r#"You are a document analysis assistant. Your task is to analyze documents and provide structured information.
Always respond with a valid JSON object containing exactly these fields:
- summary: A concise summary of the key points
- riskRating: A number between 1 and 5 (1=lowest risk and 5 is highest risk)
- additionalInfo: An array of strings with important notes

Format your response as a JSON object with the following structure:
{
    "summary": "string",
    "riskRating": number,
    "additionalInfo": ["string"]
}

Format your entire response as a JSON object. Do not include any other text."#;

/// Request lifecycle stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReceiveUpload,
    ExtractText,
    FetchPrompt,
    CallProvider,
    ValidateResponse,
    Respond,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ReceiveUpload => "receive_upload",
            Stage::ExtractText => "extract_text",
            Stage::FetchPrompt => "fetch_prompt",
            Stage::CallProvider => "call_provider",
            Stage::ValidateResponse => "validate_response",
            Stage::Respond => "respond",
        };
        f.write_str(name)
    }
}

/// An error together with the stage that produced it.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: AnalyzerError,
}

impl StageError {
    pub fn new(stage: Stage, error: AnalyzerError) -> Self {
        Self { stage, error }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub template_name: String,
    pub prompt_source: PromptSource,
    pub max_document_chars: usize,
}

impl AnalysisSettings {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            template_name: config.templates.name.clone(),
            prompt_source: config.templates.source,
            max_document_chars: config.provider.max_document_chars,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Runs one document through extract → prompt → provider → validate.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct AnalysisService {
    extractor: Arc<dyn TextExtractor>,
    templates: Arc<dyn TemplateStore>,
    client: Arc<dyn AnalysisClient>,
    validator: ResponseValidator,
    settings: AnalysisSettings,
}

impl AnalysisService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        templates: Arc<dyn TemplateStore>,
        client: Arc<dyn AnalysisClient>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            extractor,
            templates,
            client,
            validator: ResponseValidator::new(),
            settings,
        }
    }

    pub async fn analyze(
        &self,
        document: UploadedDocument,
    ) -> std::result::Result<AnalysisResult, StageError> {
        tracing::debug!(
            "Processing PDF file: {} ({} bytes)",
            document.filename,
            document.bytes.len()
        );

        let text = self
            .extract_text(document)
            .await
            .map_err(|e| StageError::new(Stage::ExtractText, e))?;

        let system_prompt = self
            .resolve_system_prompt()
            .await
            .map_err(|e| StageError::new(Stage::FetchPrompt, e))?;

        tracing::debug!("Sending request to provider...");
        let raw_reply = self
            .client
            .analyze(&system_prompt, &text)
            .await
            .map_err(|e| StageError::new(Stage::CallProvider, e))?;
        tracing::debug!("Received response from provider");

        let result = self.validator.validate(&raw_reply).map_err(|failure| {
            tracing::error!("Raw response was: {}", raw_reply);
            StageError::new(Stage::ValidateResponse, failure.into())
        })?;

        tracing::debug!("Validation successful, returning result");
        Ok(result)
    }

    async fn extract_text(&self, document: UploadedDocument) -> Result<String> {
        let extractor = Arc::clone(&self.extractor);
        let bytes = document.bytes;

        // lopdf parsing is CPU-bound
        let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| AnalyzerError::internal(format!("Text extraction task failed: {}", e)))??;

        tracing::debug!("Extracted text length: {} characters", text.chars().count());
        if text.trim().is_empty() {
            return Err(AnalyzerError::EmptyDocument);
        }

        Ok(truncate_chars(text, self.settings.max_document_chars))
    }

    async fn resolve_system_prompt(&self) -> Result<String> {
        let name = &self.settings.template_name;

        match self.settings.prompt_source {
            PromptSource::Store => {
                let template = self.templates.fetch(name).await?;
                tracing::debug!(
                    "Using stored prompt template '{}' (created {})",
                    template.name,
                    template.created_at
                );
                Ok(template.prompt)
            }
            PromptSource::Builtin => {
                if !self.templates.is_configured() {
                    tracing::debug!("No template store configured, using built-in prompt");
                    return Ok(SYSTEM_PROMPT.to_string());
                }
                // fetched for visibility only; never blocks the request
                match self.templates.fetch(name).await {
                    Ok(template) => tracing::debug!(
                        "Prompt template '{}' found but not applied (source = builtin)",
                        template.name
                    ),
                    Err(e) => tracing::warn!("Prompt template lookup failed: {}", e),
                }
                Ok(SYSTEM_PROMPT.to_string())
            }
        }
    }
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            tracing::warn!(
                "Document text exceeds {} characters, truncating before analysis",
                max_chars
            );
            let mut text = text;
            text.truncate(byte_index);
            text
        }
        None => text,
    }
}

use crate::core::validator::ValidationFailure;
use thiserror::Error;

/// 錯誤分類，對應請求生命週期中失敗的來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ClientInput,
    Configuration,
    UpstreamProvider,
    ResponseContract,
    Store,
    Document,
    Internal,
}

/// Display text of every variant is the `error` string returned to callers.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("No PDF file uploaded")]
    NoFileUploaded,

    #[error("No file selected")]
    NoFileSelected,

    #[error("Failed to read upload: {message}")]
    UploadError { message: String },

    #[error("PDF file exceeds the upload limit of {limit} bytes")]
    UploadTooLarge { limit: usize },

    #[error("Failed to read PDF: {message}")]
    MalformedDocument { message: String },

    #[error("No text content found in PDF")]
    EmptyDocument,

    #[error("No active prompt template found for {name}")]
    TemplateNotFound { name: String },

    #[error("Prompt template store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Anthropic API key not found")]
    ProviderAuthError,

    #[error("AI service error: {message}")]
    ProviderError { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    Internal { message: String },
}

impl AnalyzerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalyzerError::NoFileUploaded
            | AnalyzerError::NoFileSelected
            | AnalyzerError::UploadError { .. }
            | AnalyzerError::UploadTooLarge { .. }
            | AnalyzerError::EmptyDocument => ErrorCategory::ClientInput,
            AnalyzerError::MalformedDocument { .. } => ErrorCategory::Document,
            AnalyzerError::TemplateNotFound { .. } | AnalyzerError::StoreUnavailable { .. } => {
                ErrorCategory::Store
            }
            AnalyzerError::ProviderAuthError
            | AnalyzerError::ConfigError { .. }
            | AnalyzerError::ConfigValidationError { .. }
            | AnalyzerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AnalyzerError::ProviderError { .. } => ErrorCategory::UpstreamProvider,
            AnalyzerError::Validation(_) => ErrorCategory::ResponseContract,
            AnalyzerError::IoError(_) | AnalyzerError::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// HTTP status code for this error. Only client input problems are 4xx.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyzerError::UploadTooLarge { .. } => 413,
            _ if self.category() == ErrorCategory::ClientInput => 400,
            _ => 500,
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        AnalyzerError::ProviderError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AnalyzerError::Internal {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        AnalyzerError::provider(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

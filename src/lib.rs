pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use app::Application;
pub use config::{PromptSource, ServiceConfig};
pub use crate::core::{AnalysisService, AnalysisSettings, ResponseValidator, ValidationFailure};
pub use domain::model::{AnalysisResult, UploadedDocument};
pub use utils::error::{AnalyzerError, ErrorCategory, Result};

pub mod analyzer;
pub mod validator;

pub use crate::domain::model::{AnalysisResult, PromptTemplate, UploadedDocument};
pub use crate::domain::ports::{AnalysisClient, TemplateStore, TextExtractor};
pub use crate::utils::error::Result;
pub use analyzer::{AnalysisService, AnalysisSettings, Stage, StageError};
pub use validator::{ResponseValidator, ValidationFailure};

use crate::domain::model::PromptTemplate;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Turns raw document bytes into text, pages concatenated in order.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Most recently created active template for `name`.
    async fn fetch(&self, name: &str) -> Result<PromptTemplate>;

    /// Whether a backing store is configured at all.
    fn is_configured(&self) -> bool {
        true
    }
}

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Sends one request and returns the provider's raw text reply.
    async fn analyze(&self, system_prompt: &str, document_text: &str) -> Result<String>;
}

// Adapters layer: concrete implementations of the domain ports.

pub mod anthropic;
pub mod pdf;
pub mod template_store;

pub use anthropic::AnthropicClient;
pub use pdf::LopdfExtractor;
pub use template_store::{PgTemplateStore, StaticTemplateStore};

use crate::domain::ports::TextExtractor;
use crate::utils::error::{AnalyzerError, Result};
use lopdf::Document;

/// Page-ordered text extraction backed by `lopdf`.
///
/// Page texts are joined with no separator, so the last word of one page can
/// run into the first word of the next.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for LopdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let document = Document::load_mem(bytes).map_err(|e| AnalyzerError::MalformedDocument {
            message: e.to_string(),
        })?;

        // get_pages() is keyed by page number, so iteration follows page order
        let pages = document.get_pages();
        tracing::debug!("Extracting text from {} page(s)", pages.len());

        let mut text = String::new();
        for page_number in pages.keys() {
            let page_text = document.extract_text(&[*page_number]).map_err(|e| {
                AnalyzerError::MalformedDocument {
                    message: format!("page {}: {}", page_number, e),
                }
            })?;
            text.push_str(&page_text);
        }

        Ok(text)
    }
}

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A single uploaded file, owned by one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Latest active row of `prompt_templates` for a name.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PromptTemplate {
    pub name: String,
    pub prompt: String,
    pub created_at: NaiveDateTime,
}

/// A provider reply that passed validation.
///
/// Holds the parsed object exactly as received, extra fields included, plus the
/// coerced risk rating. Serializes as the original object.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    fields: Map<String, Value>,
    risk_rating: f64,
}

impl AnalysisResult {
    pub(crate) fn new(fields: Map<String, Value>, risk_rating: f64) -> Self {
        Self {
            fields,
            risk_rating,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.fields.get("summary").and_then(Value::as_str)
    }

    pub fn risk_rating(&self) -> f64 {
        self.risk_rating
    }

    pub fn additional_info(&self) -> Vec<&Value> {
        self.fields
            .get("additionalInfo")
            .and_then(Value::as_array)
            .map(|items| items.iter().collect())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

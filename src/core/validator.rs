//! Validation of the provider's raw reply against the analysis contract.
//!
//! Steps run in order and stop at the first failure:
//! JSON syntax, object shape, required fields, `riskRating` range,
//! `additionalInfo` type. A reply is never repaired.

use crate::domain::model::AnalysisResult;
use serde_json::{Map, Value};
use thiserror::Error;

pub const REQUIRED_FIELDS: [&str; 3] = ["summary", "riskRating", "additionalInfo"];

pub const MIN_RISK_RATING: f64 = 1.0;
pub const MAX_RISK_RATING: f64 = 5.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    #[error("Failed to parse AI response")]
    InvalidJson,

    #[error("AI response must be a JSON object")]
    NotAnObject,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Risk rating must be a number, got {0}")]
    NonNumericRisk(String),

    #[error("Risk rating {0} is not between 1 and 5")]
    OutOfRangeRisk(f64),

    #[error("{field} must be an array")]
    WrongType { field: &'static str },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, raw_reply: &str) -> Result<AnalysisResult, ValidationFailure> {
        let parsed: Value = serde_json::from_str(raw_reply).map_err(|e| {
            tracing::debug!("JSON parsing error: {}", e);
            ValidationFailure::InvalidJson
        })?;

        let Value::Object(fields) = parsed else {
            return Err(ValidationFailure::NotAnObject);
        };

        let missing = missing_fields(&fields);
        if !missing.is_empty() {
            return Err(ValidationFailure::MissingFields(missing));
        }

        let risk_rating = coerce_risk_rating(&fields["riskRating"])?;
        if !(MIN_RISK_RATING..=MAX_RISK_RATING).contains(&risk_rating) {
            return Err(ValidationFailure::OutOfRangeRisk(risk_rating));
        }

        if !fields["additionalInfo"].is_array() {
            return Err(ValidationFailure::WrongType {
                field: "additionalInfo",
            });
        }

        Ok(AnalysisResult::new(fields, risk_rating))
    }
}

fn missing_fields(fields: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| !fields.contains_key(*name))
        .collect()
}

/// Numbers, numeric strings and booleans (`true` is 1, `false` is 0) are accepted.
fn coerce_risk_rating(value: &Value) -> Result<f64, ValidationFailure> {
    match value {
        Value::Bool(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| ValidationFailure::NonNumericRisk(number.to_string())),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationFailure::NonNumericRisk(value.to_string())),
        other => Err(ValidationFailure::NonNumericRisk(other.to_string())),
    }
}

//! # Vision Model Output Decoding
//!
//! Best-effort decoding of a vision-language model's text response into an
//! [`ExtractionResult`]. Models often wrap the requested JSON object in prose or
//! code fences, so the outermost `{...}` span is decoded. Ingredient entries go
//! through the same cleanup, validation and deduplication as OCR candidates.

use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::deduplication::{RecordAssembler, RejectReason};
use crate::errors::{error_logging, AppError, AppResult};
use crate::observability;
use crate::parser_config::ParserConfig;
use crate::types::{ExtractionMethod, ExtractionResult};

/// Error reported when a response holds no decodable JSON object
pub const NO_JSON_ERROR: &str = "Could not parse JSON from response";

/// The JSON object a vision model is prompted to produce.
///
/// Fields are kept as raw JSON so one null or mistyped entry cannot sink the
/// whole response; the accessors read them loosely.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    #[serde(default)]
    pub product_name: Value,
    #[serde(default)]
    pub serving_size: Value,
    #[serde(default)]
    pub ingredients: Value,
}

impl ModelResponse {
    pub fn product_name(&self) -> Option<String> {
        non_empty(scalar_text(&self.product_name))
    }

    pub fn serving_size(&self) -> Option<String> {
        non_empty(scalar_text(&self.serving_size))
    }

    /// Ingredient entries in response order; a non-array value holds none
    pub fn ingredients(&self) -> Vec<ModelIngredient> {
        match &self.ingredients {
            Value::Array(items) => items.iter().map(ModelIngredient::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

/// One ingredient entry; amounts and percentages may arrive as strings or numbers
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIngredient {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    pub unit: Value,
    #[serde(default)]
    pub percent_daily_value: Value,
}

impl ModelIngredient {
    /// Read an entry; anything that is not an object becomes an empty entry
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Validate the entry and hand it to the assembler
    fn push_into(&self, assembler: &mut RecordAssembler) -> Result<bool, RejectReason> {
        let name = self.name.as_str().ok_or(RejectReason::MissingName)?;
        let amount = scalar_text(&self.amount).ok_or(RejectReason::InvalidAmount)?;
        let unit = self.unit.as_str().ok_or(RejectReason::UnknownUnit)?;
        assembler.push(name, &amount, unit, percent_text(&self.percent_daily_value))
    }
}

/// The outermost `{...}` span of a response, if any
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Decode the JSON object embedded in a model response
pub fn parse_model_response(content: &str) -> AppResult<ModelResponse> {
    let json = extract_json_object(content)
        .ok_or_else(|| AppError::ModelOutput("no JSON object in response".to_string()))?;
    Ok(serde_json::from_str(json)?)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn percent_text(value: &Value) -> Option<String> {
    let text = scalar_text(value)?;
    if text.is_empty() {
        None
    } else if text.ends_with('%') {
        Some(text)
    } else {
        Some(format!("{}%", text))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Turn a model response into an extraction result.
///
/// Never panics. A response without a decodable JSON object yields a failed
/// result carrying [`NO_JSON_ERROR`].
pub fn decode_model_response(content: &str, config: &ParserConfig) -> ExtractionResult {
    let span = observability::parser_span("decode_model_response");
    let _guard = span.enter();
    let start_time = Instant::now();

    let response = match parse_model_response(content) {
        Ok(response) => response,
        Err(e) => {
            error_logging::log_model_output_error(&e, "decode_model_response", content);
            observability::record_extraction_metrics(
                ExtractionMethod::VisionModel,
                false,
                start_time.elapsed(),
                content.len(),
                content.lines().count(),
                0,
            );
            return ExtractionResult::failure(ExtractionMethod::VisionModel, NO_JSON_ERROR, content);
        }
    };

    let ingredients = response.ingredients();
    debug!(entries = ingredients.len(), "Decoded model response JSON");

    let mut assembler = RecordAssembler::new(config.unit_case);
    for ingredient in &ingredients {
        match ingredient.push_into(&mut assembler) {
            Ok(true) => {}
            Ok(false) => {
                trace!("Duplicate model ingredient {}", ingredient.name);
                observability::record_rejected_candidate(RejectReason::Duplicate.as_str());
            }
            Err(reason) => {
                trace!(
                    "Rejected model ingredient {}: {}",
                    ingredient.name,
                    reason.as_str()
                );
                observability::record_rejected_candidate(reason.as_str());
            }
        }
    }

    let result = ExtractionResult {
        success: true,
        product_name: response
            .product_name()
            .unwrap_or_else(|| config.defaults.product_name.clone()),
        serving_size: response
            .serving_size()
            .or_else(|| config.defaults.serving_size.clone()),
        ingredients: assembler.into_records(),
        raw_text: content.to_string(),
        method: ExtractionMethod::VisionModel,
        error: None,
    };

    let duration = start_time.elapsed();
    observability::record_extraction_metrics(
        result.method,
        true,
        duration,
        content.len(),
        content.lines().count(),
        result.ingredients.len(),
    );
    info!(
        product_name = %result.product_name,
        ingredients = result.ingredients.len(),
        "Decoded vision model response"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("Here: {\"a\": {\"b\": 1}} done"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("no json"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_model_response_errors() {
        assert!(matches!(parse_model_response("plain text"), Err(AppError::ModelOutput(_))));
        assert!(matches!(parse_model_response("{not json}"), Err(AppError::ModelOutput(_))));
    }

    #[test]
    fn test_amount_and_percent_forms() {
        assert_eq!(scalar_text(&serde_json::json!(25)), Some("25".to_string()));
        assert_eq!(scalar_text(&serde_json::json!(" 1,000 ")), Some("1,000".to_string()));
        assert_eq!(scalar_text(&serde_json::json!(null)), None);
        assert_eq!(percent_text(&serde_json::json!(556)), Some("556%".to_string()));
        assert_eq!(percent_text(&serde_json::json!("<1%")), Some("<1%".to_string()));
        assert_eq!(percent_text(&serde_json::json!("")), None);
    }

    #[test]
    fn test_entry_that_is_not_an_object() {
        let entry = ModelIngredient::from_value(&serde_json::json!("zinc 15 mg"));
        assert!(entry.name.is_null());
        let mut assembler = RecordAssembler::new(ParserConfig::default().unit_case);
        assert_eq!(entry.push_into(&mut assembler), Err(RejectReason::MissingName));
    }

    #[test]
    fn test_non_array_ingredients_hold_nothing() {
        let response = parse_model_response(r#"{"productName": 42, "ingredients": "none"}"#).unwrap();
        assert!(response.ingredients().is_empty());
        assert_eq!(response.product_name().as_deref(), Some("42"));
    }

    #[test]
    fn test_decode_without_json() {
        let result = decode_model_response("I cannot read this label.", &ParserConfig::default());
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(NO_JSON_ERROR));
        assert_eq!(result.method, ExtractionMethod::VisionModel);
        assert_eq!(result.raw_text, "I cannot read this label.");
    }
}

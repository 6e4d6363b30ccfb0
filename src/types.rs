//! # Extraction Types
//!
//! Records produced by the parser and serialized as the JSON contract:
//! `success`, `productName`, `servingSize`, `ingredients`, `rawText`, `method`.

use serde::{Deserialize, Serialize};

use crate::parser_config::UnitCase;

/// Recognized quantity units on supplement labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Gram,
    Milligram,
    Microgram,
    InternationalUnit,
}

impl Unit {
    /// Map a captured unit token to a unit, case-insensitively.
    ///
    /// Both the Greek small mu ("μg") and the micro sign ("µg") map to micrograms.
    pub fn from_token(token: &str) -> Option<Unit> {
        match token.trim().to_lowercase().as_str() {
            "g" => Some(Unit::Gram),
            "mg" => Some(Unit::Milligram),
            "mcg" | "μg" | "µg" => Some(Unit::Microgram),
            "iu" => Some(Unit::InternationalUnit),
            _ => None,
        }
    }

    /// Render the unit token under the given case convention
    pub fn render(self, case: UnitCase) -> &'static str {
        match (self, case) {
            (Unit::InternationalUnit, _) => "IU",
            (Unit::Gram, UnitCase::Upper) => "G",
            (Unit::Milligram, UnitCase::Upper) => "MG",
            (Unit::Microgram, UnitCase::Upper) => "MCG",
            (Unit::Gram, UnitCase::IuOnly) => "g",
            (Unit::Milligram, UnitCase::IuOnly) => "mg",
            (Unit::Microgram, UnitCase::IuOnly) => "mcg",
        }
    }
}

/// Tag identifying which extraction path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Rule-based parsing of OCR text
    #[default]
    Ocr,
    /// Structured output decoded from a vision-language model response
    VisionModel,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::VisionModel => "vision_model",
        }
    }
}

/// One ingredient line of a Supplement Facts panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRecord {
    /// Title-cased display name (e.g. "Vitamin C", "Rose Hips Powder")
    pub name: String,
    /// Decimal amount as written, without thousands separators (e.g. "1", "25", "1000")
    pub amount: String,
    /// Unit token rendered under the active `UnitCase`
    pub unit: String,
    /// Percent daily value when printed next to the amount (e.g. "556%")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_daily_value: Option<String>,
}

/// Result of one extraction, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    pub product_name: String,
    pub serving_size: Option<String>,
    /// Ingredients in detection order, duplicates removed
    pub ingredients: Vec<IngredientRecord>,
    /// The untouched input text
    pub raw_text: String,
    pub method: ExtractionMethod,
    /// Reported by callers when an external collaborator failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Build a failed result for a collaborator error (OCR engine, model endpoint)
    pub fn failure(method: ExtractionMethod, error: impl Into<String>, raw_text: &str) -> Self {
        Self {
            success: false,
            product_name: String::new(),
            serving_size: None,
            ingredients: Vec::new(),
            raw_text: raw_text.to_string(),
            method,
            error: Some(error.into()),
        }
    }
}

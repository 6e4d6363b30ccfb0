//! # Supplement Facts Parser
//!
//! Extracts structured ingredient records (name, amount, unit, optional percent
//! daily value) from noisy OCR text of supplement and vitamin labels, and decodes
//! vision-model JSON responses into the same result shape.

pub mod config;
pub mod deduplication;
pub mod errors;
pub mod ingredient_matcher;
pub mod ingredient_patterns;
pub mod model_output;
pub mod normalization;
pub mod observability;
pub mod observability_config;
pub mod parser;
pub mod parser_config;
pub mod section_detection;
pub mod types;

// Re-export types for easier access
pub use model_output::decode_model_response;
pub use parser::SupplementFactsParser;
pub use parser_config::{ContextDefaults, ParserConfig, UnitCase};
pub use types::{ExtractionMethod, ExtractionResult, IngredientRecord};

//! # Parser Configuration
//!
//! The variant points of the supplement facts parser: default sentinel strings,
//! unit case convention and which matching tiers are enabled.

use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::{AppError, AppResult};
use crate::types::ExtractionMethod;

/// Case convention applied to unit tokens in emitted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitCase {
    /// Every unit upper-cased ("G", "MG", "MCG", "IU")
    #[default]
    Upper,
    /// Only IU upper-cased, other units lower-cased ("g", "mg", "mcg", "IU")
    IuOnly,
}

impl UnitCase {
    fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "upper" => Ok(UnitCase::Upper),
            "iu_only" => Ok(UnitCase::IuOnly),
            other => Err(AppError::Config(format!(
                "PARSER_UNIT_CASE must be 'upper' or 'iu_only', got '{}'",
                other
            ))),
        }
    }
}

/// Values used when the label does not state a product name or serving size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDefaults {
    pub product_name: String,
    pub serving_size: Option<String>,
}

impl ContextDefaults {
    /// "Unknown Product" / "Unknown"
    pub fn standard() -> Self {
        Self {
            product_name: "Unknown Product".to_string(),
            serving_size: Some("Unknown".to_string()),
        }
    }

    /// "Vitamin Supplement" / "1 Tablet"
    pub fn supplement_label() -> Self {
        Self {
            product_name: "Vitamin Supplement".to_string(),
            serving_size: Some("1 Tablet".to_string()),
        }
    }

    fn from_preset(name: &str) -> AppResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::standard()),
            "supplement_label" => Ok(Self::supplement_label()),
            other => Err(AppError::Config(format!(
                "PARSER_DEFAULTS must be 'standard' or 'supplement_label', got '{}'",
                other
            ))),
        }
    }
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// Configuration options for the supplement facts parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Fallback product name and serving size
    pub defaults: ContextDefaults,
    /// Case convention for emitted unit tokens
    pub unit_case: UnitCase,
    /// Whether the keyword-based composite tier runs
    pub enable_composite: bool,
    /// Whether the bare-numeric fallback tier runs inside the facts panel
    pub enable_fallback: bool,
    /// Method tag written into results
    pub method: ExtractionMethod,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            defaults: ContextDefaults::standard(),
            unit_case: UnitCase::Upper,
            enable_composite: true,
            enable_fallback: true,
            method: ExtractionMethod::Ocr,
        }
    }
}

impl ParserConfig {
    /// Load parser configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(preset) = env::var("PARSER_DEFAULTS") {
            config.defaults = ContextDefaults::from_preset(&preset)?;
        }
        if let Ok(case) = env::var("PARSER_UNIT_CASE") {
            config.unit_case = UnitCase::parse(&case)?;
        }
        config.enable_composite = env::var("PARSER_ENABLE_COMPOSITE")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| AppError::Config("PARSER_ENABLE_COMPOSITE must be true or false".to_string()))?;
        config.enable_fallback = env::var("PARSER_ENABLE_FALLBACK")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .map_err(|_| AppError::Config("PARSER_ENABLE_FALLBACK must be true or false".to_string()))?;

        Ok(config)
    }

    /// Validate parser configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.defaults.product_name.trim().is_empty() {
            return Err(AppError::Config(
                "default product name cannot be empty".to_string(),
            ));
        }

        if let Some(serving) = &self.defaults.serving_size {
            if serving.trim().is_empty() {
                return Err(AppError::Config(
                    "default serving size cannot be empty if provided".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.defaults.product_name, "Unknown Product");
        assert_eq!(config.defaults.serving_size.as_deref(), Some("Unknown"));
        assert_eq!(config.unit_case, UnitCase::Upper);
        assert!(config.enable_composite);
        assert!(config.enable_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ParserConfig::default();

        config.defaults.product_name = "   ".to_string();
        assert!(config.validate().is_err());
        config.defaults.product_name = "Unknown Product".to_string();

        config.defaults.serving_size = Some(String::new());
        assert!(config.validate().is_err());

        config.defaults.serving_size = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let label = ContextDefaults::supplement_label();
        assert_eq!(label.product_name, "Vitamin Supplement");
        assert_eq!(label.serving_size.as_deref(), Some("1 Tablet"));

        assert_eq!(ContextDefaults::from_preset("STANDARD").unwrap(), ContextDefaults::standard());
        assert!(ContextDefaults::from_preset("merged").is_err());
    }

    #[test]
    fn test_unit_case_parsing() {
        assert_eq!(UnitCase::parse("upper").unwrap(), UnitCase::Upper);
        assert_eq!(UnitCase::parse(" IU_ONLY ").unwrap(), UnitCase::IuOnly);
        assert!(UnitCase::parse("lower").is_err());
    }
}

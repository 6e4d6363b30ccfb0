//! # Unified Application Configuration
//!
//! Consolidates parser and observability settings into a single configuration
//! object loaded from environment variables and validated before use.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use crate::parser_config::ParserConfig;

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Parser variant points
    pub parser: ParserConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            parser: ParserConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        })
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.parser.validate()?;
        self.observability
            .validate()
            .map_err(|e| AppError::Config(format!("Invalid observability configuration: {}", e)))?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: default_product={}, unit_case={:?}, composite={}, fallback={}, environment={}, log_level={}, metrics_export={}",
            self.parser.defaults.product_name,
            self.parser.unit_case,
            self.parser.enable_composite,
            self.parser.enable_fallback,
            self.observability.environment,
            self.observability.log_level,
            self.observability.enable_metrics_export
        )
    }
}

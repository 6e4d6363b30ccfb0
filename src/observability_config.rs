//! # Observability Configuration
//!
//! Environment-specific configuration for logging and metrics export.

use std::env;

/// Observability configuration for different environments
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level for the crate's own targets
    pub log_level: String,
    /// Log output format ("json" or "pretty")
    pub log_format: String,
    /// Whether to install the Prometheus recorder and print the exposition
    pub enable_metrics_export: bool,
    /// Global labels attached to every exported metric
    pub tags: Vec<(String, String)>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            enable_metrics_export: false,
            tags: Vec::new(),
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            enable_metrics_export: env::var("ENABLE_METRICS_EXPORT")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            tags: env::var("METRICS_TAGS")
                .map(|tags| parse_tags(&tags))
                .unwrap_or_default(),
        }
    }

    /// Whether logs should use the human-readable layer
    pub fn uses_pretty_logs(&self) -> bool {
        self.log_format == "pretty"
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!("Invalid log level: {}", self.log_level));
        }

        if self.log_format != "json" && self.log_format != "pretty" {
            return Err(format!("Invalid log format: {}", self.log_format));
        }

        if let Some((key, _)) = self.tags.iter().find(|(key, _)| key.is_empty()) {
            return Err(format!("Invalid metrics tag key: '{}'", key));
        }

        Ok(())
    }
}

/// Parse tags from environment variable string
/// Format: "key1=value1,key2=value2,key3=value3"
fn parse_tags(tags_str: &str) -> Vec<(String, String)> {
    tags_str
        .split(',')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) => Some((key.trim().to_string(), value.trim().to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Environment-specific configuration presets
pub mod presets {
    use super::ObservabilityConfig;

    /// Development configuration: readable debug logs and metrics
    pub fn development() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "development".to_string(),
            log_level: "debug".to_string(),
            log_format: "pretty".to_string(),
            enable_metrics_export: true,
            ..Default::default()
        }
    }

    /// Production configuration: JSON logs at warn level
    pub fn production() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "production".to_string(),
            log_level: "warn".to_string(),
            log_format: "json".to_string(),
            enable_metrics_export: true,
            ..Default::default()
        }
    }

    /// Minimal configuration for batch runs
    pub fn minimal() -> ObservabilityConfig {
        ObservabilityConfig {
            environment: "minimal".to_string(),
            log_level: "error".to_string(),
            enable_metrics_export: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.environment, "development");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "json");
        assert!(!config.enable_metrics_export);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ObservabilityConfig::default();

        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        config.log_level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        config.log_format = "xml".to_string();
        assert!(config.validate().is_err());

        config.log_format = "pretty".to_string();
        config.tags = vec![(String::new(), "x".to_string())];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tag_parsing() {
        let tags = parse_tags("env=prod, version=1.2.3,broken,service=cli");

        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0], ("env".to_string(), "prod".to_string()));
        assert_eq!(tags[1], ("version".to_string(), "1.2.3".to_string()));
        assert_eq!(tags[2], ("service".to_string(), "cli".to_string()));
    }

    #[test]
    fn test_presets() {
        let dev = presets::development();
        assert_eq!(dev.environment, "development");
        assert!(dev.uses_pretty_logs());
        assert!(dev.validate().is_ok());

        let prod = presets::production();
        assert_eq!(prod.environment, "production");
        assert!(!prod.uses_pretty_logs());
        assert_eq!(prod.log_level, "warn");

        let minimal = presets::minimal();
        assert_eq!(minimal.environment, "minimal");
        assert!(!minimal.enable_metrics_export);
    }
}

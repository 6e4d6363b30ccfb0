//! # Application Error Types
//!
//! This module defines common error types used throughout the supplement facts parser.
//! The parser itself never fails on text input; these errors cover configuration,
//! input reading and the decoding of vision-model responses.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// File system errors
    FileSystem(String),
    /// Vision-model response decoding errors
    ModelOutput(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::FileSystem(msg) => write!(f, "[FILESYSTEM] {}", msg),
            AppError::ModelOutput(msg) => write!(f, "[MODEL_OUTPUT] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystem(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ModelOutput(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting
pub mod error_logging {
    use tracing::error;

    /// Log file system errors with path and operation context
    pub fn log_filesystem_error(
        error: &impl std::fmt::Display,
        operation: &str,
        path: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            path = ?path,
            "File system operation failed"
        );
    }

    /// Log vision-model decoding errors with a bounded excerpt of the response
    pub fn log_model_output_error(
        error: &impl std::fmt::Display,
        operation: &str,
        response: &str,
    ) {
        error!(
            error = %error,
            operation = %operation,
            response_length = response.len(),
            response_excerpt = %response.chars().take(100).collect::<String>(),
            "Model output decoding failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_tags() {
        assert_eq!(
            AppError::Config("bad value".to_string()).to_string(),
            "[CONFIG] bad value"
        );
        assert_eq!(
            AppError::ModelOutput("no json".to_string()).to_string(),
            "[MODEL_OUTPUT] no json"
        );
    }

    #[test]
    fn test_error_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(AppError::from(io), AppError::FileSystem(_)));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(AppError::from(json), AppError::ModelOutput(_)));
    }
}

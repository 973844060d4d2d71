//! Error types for Sift
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Sift operations
///
/// State-machine operations return this type directly so callers can
/// match on the variant. Application-level code wraps it in `anyhow`
/// through the [`Result`] alias.
#[derive(Error, Debug)]
pub enum SiftError {
    /// Query was empty or whitespace-only
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Requested sample count is unusable
    #[error("Invalid sample count: {0}")]
    InvalidSampleCount(usize),

    /// Operation issued while the session is in the wrong phase
    #[error("Cannot {operation} during {actual} phase (expected {expected})")]
    PhaseViolation {
        /// Operation that was attempted
        operation: &'static str,
        /// Phase the operation requires
        expected: &'static str,
        /// Phase the session was actually in
        actual: &'static str,
    },

    /// Sample addressed by id is not the one awaiting a label
    #[error("Sample {0} is not the current sample")]
    SampleNotCurrent(String),

    /// Processing already reached the total item count
    #[error("Processing is already complete")]
    ProcessingComplete,

    /// Session was replaced or shut down
    #[error("Session has been closed")]
    SessionClosed,

    /// Rule definition failed validation
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// No rule with the given id exists
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Sift operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Result type for operations that report a specific [`SiftError`]
pub type SiftResult<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_error_display() {
        let error = SiftError::EmptyQuery;
        assert_eq!(error.to_string(), "Query cannot be empty");
    }

    #[test]
    fn test_phase_violation_error_display() {
        let error = SiftError::PhaseViolation {
            operation: "label sample",
            expected: "sampling",
            actual: "processing",
        };
        assert_eq!(
            error.to_string(),
            "Cannot label sample during processing phase (expected sampling)"
        );
    }

    #[test]
    fn test_sample_not_current_error_display() {
        let error = SiftError::SampleNotCurrent("sample-3".to_string());
        assert_eq!(error.to_string(), "Sample sample-3 is not the current sample");
    }

    #[test]
    fn test_rule_not_found_error_display() {
        let error = SiftError::RuleNotFound("42".to_string());
        assert_eq!(error.to_string(), "Rule not found: 42");
    }

    #[test]
    fn test_config_error_display() {
        let error = SiftError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SiftError = io_error.into();
        assert!(matches!(error, SiftError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error: SiftError = json_error.into();
        assert!(matches!(error, SiftError::Serialization(_)));
    }

    #[test]
    fn test_error_into_anyhow() {
        let result: Result<()> = Err(SiftError::ProcessingComplete.into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiftError>(),
            Some(SiftError::ProcessingComplete)
        ));
    }
}

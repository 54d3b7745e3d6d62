//! Error types for the cyclecalc_core library.
//!
//! The calculators themselves never fail; these errors belong to the
//! calling layer (input validation, configuration and persistence).

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cyclecalc_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Caller-supplied input rejected before reaching a calculator
    #[error("Invalid {field} '{value}': {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Static reference table failed validation
    #[error("Reference data error: {0}")]
    ReferenceData(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`]
    pub fn validation(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::Validation {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the error came from input validation rather than I/O
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = Error::validation("cycle_length", 50, "must be between 21 and 45");
        assert_eq!(
            err.to_string(),
            "Invalid cycle_length '50': must be between 21 and 45"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_io_is_not_validation() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(!err.is_validation());
    }
}

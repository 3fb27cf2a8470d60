//! Common types and utilities for svcmodel
//!
//! This crate contains the normalized service model produced by the
//! translator, the shared error type, and the translation options used
//! by the translator and CLI components.

mod model;
mod options;

pub use model::*;
pub use options::TranslateOptions;

use thiserror::Error;

/// Errors that can occur while translating a service description
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The raw description names a signer this model cannot express
    #[error("unhandled signature version `{0}`")]
    UnknownSignatureVersion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_error_message() {
        let err = TranslateError::UnknownSignatureVersion("v9".to_string());
        assert_eq!(err.to_string(), "unhandled signature version `v9`");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TranslateError = json_err.into();
        assert!(matches!(err, TranslateError::Json(_)));
    }
}

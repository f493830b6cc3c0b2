//! Error types for fraud engine

use thiserror::Error;

/// Fraud engine error
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Configuration override could not be parsed
    #[error("Invalid configuration for {key}={value:?}: {reason}")]
    InvalidConfig {
        /// Override key
        key: String,
        /// Raw value as supplied
        value: String,
        /// What was wrong with it
        reason: String,
    },

    /// Unknown 3-D Secure outcome
    #[error("Unknown 3-D Secure result: {0}")]
    UnknownThreeDsResult(String),
}

impl Error {
    pub(crate) fn invalid_config(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

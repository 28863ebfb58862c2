//! Layered error definitions
//!
//! Categorized by source: config / record / input document

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Record Errors =====
    /// Malformed update record
    #[error("invalid update record '{email}': {message}")]
    InvalidRecord { email: String, message: String },

    /// Malformed update-set input document
    #[error("update set error: {message}")]
    UpdateSet { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid record error
    pub fn invalid_record(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            email: email.into(),
            message: message.into(),
        }
    }

    /// Create update-set input error
    pub fn update_set(message: impl Into<String>) -> Self {
        Self::UpdateSet {
            message: message.into(),
        }
    }
}

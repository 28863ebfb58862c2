//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum CliError {
    /// Plan file not found
    #[error("Plan file not found: {path}")]
    PlanNotFound { path: String },

    /// Update-set input file not found
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    /// No update source given
    #[error("No update source: pass --input <file> or --demo-records <n>")]
    NoUpdateSource,

    /// Update-set parsing error
    #[error("Failed to parse update set: {message}")]
    InputParse { message: String },

    /// Scheduling run error
    #[error("Scheduling run failed: {message}")]
    Run { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

#[allow(dead_code)]
impl CliError {
    pub fn plan_not_found(path: impl Into<String>) -> Self {
        Self::PlanNotFound { path: path.into() }
    }

    pub fn input_not_found(path: impl Into<String>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn input_parse(message: impl Into<String>) -> Self {
        Self::InputParse {
            message: message.into(),
        }
    }

    pub fn run(message: impl Into<String>) -> Self {
        Self::Run {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, CliError>;

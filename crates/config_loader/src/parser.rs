//! Plan parsing.
//!
//! Supports TOML (primary) and JSON formats.

use contracts::{ContractError, SyncPlan};

/// Plan file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl PlanFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML plan
pub fn parse_toml(content: &str) -> Result<SyncPlan, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON plan
pub fn parse_json(content: &str) -> Result<SyncPlan, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a plan in the given format
pub fn parse(content: &str, format: PlanFormat) -> Result<SyncPlan, ContractError> {
    match format {
        PlanFormat::Toml => parse_toml(content),
        PlanFormat::Json => parse_json(content),
    }
}

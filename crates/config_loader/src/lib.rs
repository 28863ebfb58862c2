//! # Config Loader
//!
//! Scheduling plan loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON plan files
//! - Validate quota, retry and breaker policies
//! - Produce a `SyncPlan`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::PlanLoader;
//! use std::path::Path;
//!
//! let plan = PlanLoader::load_from_path(Path::new("subsync.toml")).unwrap();
//! println!("bulk quota: {}/hour", plan.bulk.max_per_window);
//! ```

mod parser;
mod validator;

pub use contracts::SyncPlan;
pub use parser::PlanFormat;

use contracts::ContractError;
use std::path::Path;

/// Scheduling plan loader
///
/// Provides static methods to load a plan from files or strings.
pub struct PlanLoader;

impl PlanLoader {
    /// Load a plan from a file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SyncPlan, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a plan from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: PlanFormat) -> Result<SyncPlan, ContractError> {
        let plan = parser::parse(content, format)?;
        validator::validate(&plan)?;
        Ok(plan)
    }

    /// Serialize a plan to a TOML string
    pub fn to_toml(plan: &SyncPlan) -> Result<String, ContractError> {
        toml::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a plan to a JSON string
    pub fn to_json(plan: &SyncPlan) -> Result<String, ContractError> {
        serde_json::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl PlanLoader {
    /// Infer plan format from file extension
    fn detect_format(path: &Path) -> Result<PlanFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        PlanFormat::from_extension(ext)
            .ok_or_else(|| ContractError::config_parse(format!("unsupported plan format: .{ext}")))
    }

    /// Read plan file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
workers = 4

[bulk]
max_per_window = 50
window_secs = 3600
records_per_call = 1000
retry_backoff_ms = 2000

[single]
max_per_window = 3600
window_secs = 3600
records_per_call = 1
retry_backoff_ms = 5000
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = PlanLoader::load_from_str(MINIMAL_TOML, PlanFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let plan = result.unwrap();
        assert_eq!(plan.workers, 4);
        assert_eq!(plan.bulk.max_per_window, 50);
        // Omitted sections take production defaults.
        assert_eq!(plan.retry.max_attempts, 5);
        assert_eq!(plan.breaker.max_failures, 10);
    }

    #[test]
    fn test_empty_plan_uses_defaults() {
        let plan = PlanLoader::load_from_str("", PlanFormat::Toml).unwrap();
        assert_eq!(plan.run_record_budget(), 53_600);
    }

    #[test]
    fn test_round_trip_toml() {
        let plan = PlanLoader::load_from_str(MINIMAL_TOML, PlanFormat::Toml).unwrap();
        let serialized = PlanLoader::to_toml(&plan).unwrap();
        let plan2 = PlanLoader::load_from_str(&serialized, PlanFormat::Toml).unwrap();
        assert_eq!(plan.workers, plan2.workers);
        assert_eq!(plan.bulk.max_per_window, plan2.bulk.max_per_window);
        assert_eq!(plan.single.retry_backoff_ms, plan2.single.retry_backoff_ms);
    }

    #[test]
    fn test_round_trip_json() {
        let plan = PlanLoader::load_from_str(MINIMAL_TOML, PlanFormat::Toml).unwrap();
        let json = PlanLoader::to_json(&plan).unwrap();
        let plan2 = PlanLoader::load_from_str(&json, PlanFormat::Json).unwrap();
        assert_eq!(plan.bulk.records_per_call, plan2.bulk.records_per_call);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // A single channel carrying more than one record per call is invalid.
        let content = r#"
[single]
max_per_window = 3600
window_secs = 3600
records_per_call = 2
retry_backoff_ms = 5000
"#;
        let result = PlanLoader::load_from_str(content, PlanFormat::Toml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("records_per_call"));
    }
}

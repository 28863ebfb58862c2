//! Plan validation.
//!
//! Rules:
//! - derive-level ranges (quota, window, workers all >= 1)
//! - single channel submits exactly one record per call
//! - retry deadline must exceed the rate-limit cooldown, or a unit
//!   rate-limited once could never be re-admitted

use contracts::{ContractError, SyncPlan};
use validator::Validate;

/// Validate a `SyncPlan`
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(plan: &SyncPlan) -> Result<(), ContractError> {
    validate_ranges(plan)?;
    validate_single_channel(plan)?;
    validate_retry_timing(plan)?;
    Ok(())
}

/// Apply the derive-level range rules
fn validate_ranges(plan: &SyncPlan) -> Result<(), ContractError> {
    plan.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "plan".to_string());
        ContractError::config_validation(field, errors.to_string())
    })
}

/// The single channel carries exactly one record per call
fn validate_single_channel(plan: &SyncPlan) -> Result<(), ContractError> {
    if plan.single.records_per_call != 1 {
        return Err(ContractError::config_validation(
            "single.records_per_call",
            format!(
                "single channel submits exactly one record per call, got {}",
                plan.single.records_per_call
            ),
        ));
    }
    Ok(())
}

/// A rate-limited unit must be able to come back before its deadline
fn validate_retry_timing(plan: &SyncPlan) -> Result<(), ContractError> {
    if plan.retry.rate_limit_cooldown() >= plan.retry.deadline() {
        return Err(ContractError::config_validation(
            "retry.rate_limit_cooldown_ms",
            format!(
                "rate-limit cooldown ({}ms) must be shorter than the retry deadline ({}s)",
                plan.retry.rate_limit_cooldown_ms, plan.retry.deadline_secs
            ),
        ));
    }
    Ok(())
}

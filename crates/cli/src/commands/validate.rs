//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use config_loader::{PlanLoader, SyncPlan};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    plan_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PlanSummary>,
}

#[derive(Serialize)]
struct PlanSummary {
    bulk_calls_per_window: usize,
    single_calls_per_window: usize,
    bulk_chunk_size: usize,
    run_record_budget: usize,
    workers: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(plan = %args.plan.display(), "Validating plan");

    let result = validate_plan(args);

    if args.json {
        let json =
            serde_json::to_string_pretty(&result).context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Plan validation failed")
    }
}

fn validate_plan(args: &ValidateArgs) -> ValidationResult {
    let plan_path = args.plan.display().to_string();

    // Check file exists
    if !args.plan.exists() {
        return ValidationResult {
            valid: false,
            plan_path,
            error: Some(format!("File not found: {}", args.plan.display())),
            warnings: None,
            summary: None,
        };
    }

    match PlanLoader::load_from_path(&args.plan) {
        Ok(plan) => {
            let warnings = collect_warnings(&plan);
            ValidationResult {
                valid: true,
                plan_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(PlanSummary {
                    bulk_calls_per_window: plan.bulk.max_per_window,
                    single_calls_per_window: plan.single.max_per_window,
                    bulk_chunk_size: plan.bulk.records_per_call,
                    run_record_budget: plan.run_record_budget(),
                    workers: plan.workers,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            plan_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect plan warnings (non-fatal issues)
fn collect_warnings(plan: &SyncPlan) -> Vec<String> {
    let mut warnings = Vec::new();

    if plan.workers == 1 {
        warnings.push("workers = 1 serializes all submissions".to_string());
    }

    // A breaker window shorter than the per-retry backoff can never
    // accumulate enough failures to trip.
    let max_backoff = plan.bulk.retry_backoff().max(plan.single.retry_backoff());
    if plan.breaker.window() < max_backoff {
        warnings.push(format!(
            "breaker window ({}s) is shorter than the retry backoff base ({}ms); the breaker may never trip",
            plan.breaker.window_secs,
            max_backoff.as_millis()
        ));
    }

    if plan.retry.deadline() < 2 * plan.retry.rate_limit_cooldown() {
        warnings.push(
            "retry deadline allows at most one rate-limit cooldown before units expire".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Plan is valid: {}", result.plan_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Bulk: {} calls/window", summary.bulk_calls_per_window);
            println!("  Single: {} calls/window", summary.single_calls_per_window);
            println!("  Chunk size: {}", summary.bulk_chunk_size);
            println!("  Run budget: {} records", summary.run_record_budget);
            println!("  Workers: {}", summary.workers);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Plan is invalid: {}", result.plan_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

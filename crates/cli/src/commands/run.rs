//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use config_loader::{PlanLoader, SyncPlan};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{demo_records, load_update_set, SyncRun, SyncRunConfig};

/// Execute the `run` command
pub async fn run_schedule(args: &RunArgs) -> Result<()> {
    let mut plan = load_plan(args)?;

    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        plan.workers = workers;
    }

    info!(
        bulk_quota = plan.bulk.max_per_window,
        single_quota = plan.single.max_per_window,
        run_budget = plan.run_record_budget(),
        workers = plan.workers,
        "Plan loaded"
    );

    // Obtain the pending update set
    let records = if let Some(ref input) = args.input {
        if !input.exists() {
            return Err(CliError::input_not_found(input.display().to_string()).into());
        }
        let records = load_update_set(input)?;
        info!(
            records = records.len(),
            input = %input.display(),
            "Update set loaded"
        );
        records
    } else if args.demo_records > 0 {
        info!(records = args.demo_records, "Generating demo update set");
        demo_records(args.demo_records)
    } else {
        return Err(CliError::NoUpdateSource.into());
    };

    // Dry run - show the partition arithmetic and exit
    if args.dry_run {
        info!("Dry run mode - not dispatching");
        print_partition_summary(&plan, records.len());
        return Ok(());
    }

    let config = SyncRunConfig {
        plan,
        records,
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let stats = SyncRun::new(config).run().await?;
    stats.print_summary();

    info!("subsync finished");
    Ok(())
}

/// Load the plan file, falling back to production defaults
fn load_plan(args: &RunArgs) -> Result<SyncPlan> {
    match &args.plan {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Plan file not found: {}", path.display());
            }
            PlanLoader::load_from_path(path)
                .with_context(|| format!("Failed to load plan from {}", path.display()))
        }
        None => {
            info!("No plan file given, using production defaults");
            Ok(SyncPlan::default())
        }
    }
}

/// Print how a set of this size would partition under the plan
fn print_partition_summary(plan: &SyncPlan, record_count: usize) {
    let bulk_records = record_count.min(plan.bulk.records_per_run());
    let bulk_units = bulk_records.div_ceil(plan.bulk.records_per_call);
    let single_records = (record_count - bulk_records).min(plan.single.max_per_window);
    let deferred = record_count - bulk_records - single_records;

    println!("\n=== Partition Summary ===\n");
    println!("Records pending: {record_count}");
    println!(
        "  Bulk: {} records in {} chunks (quota {}/hour)",
        bulk_records, bulk_units, plan.bulk.max_per_window
    );
    println!(
        "  Single: {} records (quota {}/hour)",
        single_records, plan.single.max_per_window
    );
    println!("  Deferred to a later run: {deferred}");
    println!();
}

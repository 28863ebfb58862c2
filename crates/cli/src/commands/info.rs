//! `info` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use config_loader::{PlanLoader, SyncPlan};
use contracts::Channel;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let plan = match &args.plan {
        Some(path) => {
            info!(plan = %path.display(), "Loading plan");
            PlanLoader::load_from_path(path)
                .with_context(|| format!("Failed to load plan from {}", path.display()))?
        }
        None => SyncPlan::default(),
    };

    if args.json {
        println!(
            "{}",
            PlanLoader::to_json(&plan).context("Failed to serialize plan")?
        );
        return Ok(());
    }

    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &SyncPlan) {
    println!("\n=== Effective Plan ===\n");

    for channel in [Channel::Bulk, Channel::Single] {
        let policy = plan.channel(channel);
        println!("{} channel ({}):", channel, channel.job_class());
        println!(
            "  Quota: {} calls per {}s window",
            policy.max_per_window, policy.window_secs
        );
        println!("  Records per call: {}", policy.records_per_call);
        println!(
            "  Records per run: {}",
            policy.records_per_run()
        );
        println!("  Retry backoff base: {}ms", policy.retry_backoff_ms);
        println!();
    }

    println!("Retry:");
    println!("  Max transient failures: {}", plan.retry.max_attempts);
    println!("  Deadline: {}s after first enqueue", plan.retry.deadline_secs);
    println!(
        "  Rate-limit cooldown: {}ms",
        plan.retry.rate_limit_cooldown_ms
    );

    println!("\nBreaker:");
    println!(
        "  Opens at {} failures per {}s window",
        plan.breaker.max_failures, plan.breaker.window_secs
    );
    println!("  Cooldown: {}ms", plan.breaker.cooldown_ms);

    println!("\nWorkers: {}", plan.workers);
    println!(
        "Cross-channel run budget: {} records",
        plan.run_record_budget()
    );
    println!();
}

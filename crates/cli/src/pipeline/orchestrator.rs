//! Run orchestrator - wires the scheduler to its inputs and signals.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::pin;
use tracing::{info, warn};

use contracts::{SyncPlan, UpdateBatchFile, UpdateRecord};
use scheduler::{LogSubmitter, Scheduler};

use crate::error::CliError;
use crate::pipeline::RunStats;

/// Run configuration
#[derive(Debug)]
pub struct SyncRunConfig {
    /// The scheduling plan
    pub plan: SyncPlan,

    /// Pending update set
    pub records: Vec<UpdateRecord>,

    /// Stop admissions after this long (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// One orchestrated scheduling run
pub struct SyncRun {
    config: SyncRunConfig,
}

impl SyncRun {
    /// Create a run with the given configuration
    pub fn new(config: SyncRunConfig) -> Self {
        Self { config }
    }

    /// Run the scheduler to completion
    ///
    /// Ctrl-C / SIGTERM and the optional timeout both stop admissions
    /// gracefully: in-flight submissions finish and parked units come
    /// back as deferred work in the statistics.
    pub async fn run(self) -> Result<RunStats> {
        let started = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!(port, "Metrics endpoint available");
        }

        let scheduled_records = self.config.records.len() as u64;
        let scheduler = Arc::new(
            Scheduler::new(self.config.plan, LogSubmitter::new("subsync"))
                .context("Failed to create scheduler")?,
        );

        // First shutdown signal stops admissions; the run then drains.
        let signal_scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping admissions");
            signal_scheduler.stop();
        });

        info!(records = scheduled_records, "Starting scheduling run");

        let runner = Arc::clone(&scheduler);
        let records = self.config.records;
        let run = async move { runner.schedule(records).await };
        pin!(run);

        let report = match self.config.timeout {
            Some(limit) => {
                tokio::select! {
                    report = &mut run => report,
                    () = tokio::time::sleep(limit) => {
                        warn!(timeout_secs = limit.as_secs(), "Run timeout reached, stopping admissions");
                        scheduler.stop();
                        run.await
                    }
                }
            }
            None => run.await,
        }
        .map_err(|e| CliError::run(e.to_string()))?;

        observability::record_run_summary(&report);

        let mut stats = RunStats::new(scheduled_records);
        stats.update(&report);
        stats.duration = started.elapsed();

        Ok(stats)
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Load an update set from a JSON batches document
///
/// # Errors
/// Fails on unreadable files, malformed JSON, or records without an
/// identity key or changed attributes.
pub fn load_update_set(path: &Path) -> Result<Vec<UpdateRecord>, CliError> {
    let content = std::fs::read_to_string(path)?;
    let file: UpdateBatchFile =
        serde_json::from_str(&content).map_err(|e| CliError::input_parse(e.to_string()))?;

    let records = file.into_records();
    for record in &records {
        record
            .validate()
            .map_err(|e| CliError::input_parse(e.to_string()))?;
    }
    Ok(records)
}

/// Generate a deterministic demo update set
///
/// Mirrors the upstream example data: indexed example.com addresses, all
/// moving to the same timezone.
pub fn demo_records(count: usize) -> Vec<UpdateRecord> {
    (0..count)
        .map(|index| {
            UpdateRecord::new(format!("email_{index}@example.com"))
                .with_attribute("time_zone", "America/New_York")
        })
        .collect()
}

//! Scheduling run orchestration.

mod orchestrator;
mod stats;

pub use orchestrator::{demo_records, load_update_set, SyncRun, SyncRunConfig};
pub use stats::RunStats;

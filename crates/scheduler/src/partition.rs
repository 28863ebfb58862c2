//! Update-set partitioning across the two channels.

use std::time::Instant;

use contracts::{SyncPlan, UpdateRecord};
use tracing::instrument;

use crate::unit::DispatchUnit;

/// Result of partitioning one scheduling run
#[derive(Debug)]
pub struct Partition {
    /// Units in admission order: bulk chunks first, then singles
    pub units: Vec<DispatchUnit>,
    /// Records beyond the cross-channel run budget, untouched
    pub deferred: Vec<UpdateRecord>,
}

/// Split `records` into bulk chunks and single-record units.
///
/// The first `bulk.records_per_run()` records become bulk chunks of at
/// most `bulk.records_per_call`, the next `single.max_per_window` become
/// single units, and the remainder is deferred to a later run. Every
/// record lands in exactly one unit or in `deferred`.
#[instrument(name = "partition_update_set", skip(records, plan), fields(records = records.len()))]
pub fn partition(records: Vec<UpdateRecord>, now: Instant, plan: &SyncPlan) -> Partition {
    let bulk_budget = plan.bulk.records_per_run();
    let single_budget = plan.single.max_per_window;
    let chunk_size = plan.bulk.records_per_call;

    let mut units = Vec::new();
    let mut records = records.into_iter();

    let mut chunk = Vec::with_capacity(chunk_size.min(1_024));
    let mut bulk_index = 0u64;
    for record in records.by_ref().take(bulk_budget) {
        chunk.push(record);
        if chunk.len() == chunk_size {
            units.push(DispatchUnit::batch(
                bulk_index,
                std::mem::take(&mut chunk),
                now,
                &plan.retry,
            ));
            bulk_index += 1;
        }
    }
    if !chunk.is_empty() {
        units.push(DispatchUnit::batch(bulk_index, chunk, now, &plan.retry));
    }

    for (index, record) in records.by_ref().take(single_budget).enumerate() {
        units.push(DispatchUnit::single(index as u64, record, now, &plan.retry));
    }

    let deferred: Vec<UpdateRecord> = records.collect();

    Partition { units, deferred }
}

//! LogSubmitter - the reference simulated endpoint.
//!
//! Instead of calling the real API it emits one log line per record:
//! `[<index>] attr1: 'val1', attr2: 'val2'`, identity key excluded.
//! Bulk indices are `batch_index * chunk_size + position`; single indices
//! continue after the bulk capacity, so one run produces one contiguous
//! index space across both channels.

use contracts::{SubmitOutcome, Submitter, UpdateRecord, BULK_CHUNK_SIZE, BULK_RECORDS_PER_RUN};
use tracing::{info, instrument};

/// Submitter that logs each record instead of calling the third party
pub struct LogSubmitter {
    name: String,
    chunk_size: u64,
    single_offset: u64,
}

impl LogSubmitter {
    /// Create a submitter with the production index layout
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_layout(name, BULK_CHUNK_SIZE, BULK_RECORDS_PER_RUN)
    }

    /// Create a submitter with a custom index layout
    pub fn with_layout(name: impl Into<String>, chunk_size: usize, single_offset: usize) -> Self {
        Self {
            name: name.into(),
            chunk_size: chunk_size as u64,
            single_offset: single_offset as u64,
        }
    }

    /// Logical log index for a record inside a bulk chunk
    pub fn bulk_log_index(&self, batch_index: u64, position: u64) -> u64 {
        batch_index * self.chunk_size + position
    }

    /// Logical log index for a single-channel record
    pub fn single_log_index(&self, index: u64) -> u64 {
        index + self.single_offset
    }

    fn log_record(&self, log_index: u64, record: &UpdateRecord) {
        info!(
            submitter = %self.name,
            "[{}] {}",
            log_index,
            record.attribute_summary()
        );
    }
}

impl Submitter for LogSubmitter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_submit_bulk",
        skip(self, records),
        fields(submitter = %self.name, batch_index, records = records.len())
    )]
    async fn submit_bulk(&self, batch_index: u64, records: &[UpdateRecord]) -> SubmitOutcome {
        for (position, record) in records.iter().enumerate() {
            self.log_record(self.bulk_log_index(batch_index, position as u64), record);
        }
        SubmitOutcome::Success
    }

    #[instrument(
        name = "log_submit_single",
        skip(self, record),
        fields(submitter = %self.name, index)
    )]
    async fn submit_single(&self, index: u64, record: &UpdateRecord) -> SubmitOutcome {
        self.log_record(self.single_log_index(index), record);
        SubmitOutcome::Success
    }
}

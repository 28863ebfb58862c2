//! Submitter implementations shipped with the scheduler.

mod log;

pub use log::LogSubmitter;

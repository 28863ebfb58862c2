//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Quota Model
//! - Both API channels are capped on a rolling one-hour window
//! - A quota slot is reserved immediately before each call, never after

mod channel;
mod error;
mod outcome;
mod plan;
mod record;
mod report;
mod submitter;

pub use channel::*;
pub use error::*;
pub use outcome::*;
pub use plan::*;
pub use record::*;
pub use report::*;
pub use submitter::*;

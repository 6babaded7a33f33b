//! Lifecycle orchestration for pending collection entries.

pub mod policy;
pub mod processor;

pub use policy::{Operation, Selection, select_next, suppresses_retry};
pub use processor::{DrainReport, ModProcessor, ProcessOutcome};

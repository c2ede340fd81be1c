//! Implementation of job queue using tokio channels
//! This crate implements the JobQueue trait from ferry-core using a bounded
//! tokio mpsc channel.

pub mod queue;

pub use queue::*;

// Re-export core traits for convenience
pub use ferry_core::{Job, JobQueue, JobReceiver, QueueError};

//! Core utilities and types shared across all Ferry crates

pub mod config;
pub mod jobs;
pub mod notifications;
pub mod problemdetails;
pub mod types;

// Re-export commonly used types
pub use config::*;
pub use jobs::*;
pub use problemdetails::Problem;
pub use types::*;

// Re-export external dependencies
pub use anyhow;
pub use async_trait;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tokio;
pub use tracing;
pub use uuid;

//! Core types and traits for the Ferry import system
//!
//! Importer implementations for each external service depend on this crate
//! and implement `ImporterProvider` / `ProjectImporter`.

pub mod error;
pub mod importer;

pub use error::{ImportError, ImportResult};
pub use importer::{ImportedProject, ImporterProvider, ProjectImporter, RemoteProject, RemoteUser};

pub use ferry_core::{AccessToken, ImportOptions, ImportSource, UserRef};

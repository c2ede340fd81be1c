//! Project import for Ferry
//!
//! Runs imports from external project-management services and emails the
//! requesting user when each one finishes. Imports run inline on the request
//! or on a background worker, depending on `ImportSettings::execution_mode`.

pub mod auth;
pub mod handlers;
pub mod plugin;
pub mod services;

pub use auth::{AuthContext, RequireAuth};
pub use handlers::{configure_routes, types::AppState, ImportApiDoc};
pub use plugin::ImportPlugin;
pub use services::*;

pub use ferry_import_types::{
    ImportError, ImportResult, ImportedProject, ImporterProvider, ProjectImporter,
    RemoteProject, RemoteUser,
};

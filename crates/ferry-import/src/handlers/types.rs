//! Request and response types for import handlers

use ferry_core::{ImportOptions, ImportSource};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::{ImportExecutor, ImporterRegistry};

/// Application state for handlers
pub struct AppState {
    pub registry: Arc<ImporterRegistry>,
    pub executor: ImportExecutor,
}

/// Remote project ids arrive as JSON strings or numbers depending on the service
#[derive(Deserialize)]
#[serde(untagged)]
enum RawProjectId {
    Text(String),
    Number(i64),
}

fn deserialize_project_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawProjectId>::deserialize(deserializer)?;
    Ok(raw
        .map(|id| match id {
            RawProjectId::Text(text) => text,
            RawProjectId::Number(number) => number.to_string(),
        })
        .filter(|id| !id.trim().is_empty()))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthUrlResponse {
    /// Where to send the user to grant access
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthorizeRequest {
    /// OAuth authorization code returned by the service
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorizeResponse {
    /// Access token to send back on the other importer calls
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ListProjectsRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ListUsersRequest {
    #[serde(default)]
    pub token: Option<String>,
    /// Remote project id
    #[serde(default, deserialize_with = "deserialize_project_id")]
    pub project: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportProjectRequest {
    #[serde(default)]
    pub token: Option<String>,
    /// Remote project id
    #[serde(default, deserialize_with = "deserialize_project_id")]
    pub project: Option<String>,
    /// Import toggles passed to the importer unchanged
    #[serde(default)]
    pub options: ImportOptions,
}

/// Returned when the import was queued for a background worker
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportAcceptedResponse {
    pub import_id: Uuid,
    pub source: ImportSource,
}

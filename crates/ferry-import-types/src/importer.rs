//! Importer traits
//!
//! Each external service (GitHub, Asana, ...) ships one `ImporterProvider`.
//! The provider handles the OAuth dance and hands out `ProjectImporter`s bound
//! to a user and their access token.

use async_trait::async_trait;
use ferry_core::{AccessToken, ImportOptions, ImportSource, UserRef};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ImportResult;

/// Local project created by a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportedProject {
    pub id: i32,
    #[schema(example = "demo-project")]
    pub slug: String,
    pub name: String,
}

/// Member of a remote project, with the local user it was matched to (if any)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemoteUser {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub detected_user: Option<UserRef>,
}

/// Project as listed by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemoteProject {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Talks to one external service on behalf of one user
#[async_trait]
pub trait ProjectImporter: Send + Sync {
    /// Projects visible to the token
    async fn list_projects(&self) -> ImportResult<Vec<RemoteProject>>;

    /// Members of a remote project
    async fn list_users(&self, project_id: &str) -> ImportResult<Vec<RemoteUser>>;

    /// Copy a remote project into a new local project.
    ///
    /// Implementations own any transactional creation of the local project;
    /// callers only see the finished project or an error.
    async fn import_project(
        &self,
        project_id: &str,
        options: &ImportOptions,
    ) -> ImportResult<ImportedProject>;
}

/// Per-service entry point: OAuth helpers plus an importer factory
#[async_trait]
pub trait ImporterProvider: Send + Sync {
    /// Source system identifier
    fn source(&self) -> ImportSource;

    /// URL the user visits to grant Ferry access
    fn auth_url(&self) -> ImportResult<String>;

    /// Exchange an OAuth authorization code for an access token
    async fn access_token(&self, code: &str) -> ImportResult<AccessToken>;

    /// Importer acting as `user` with `token`
    fn importer(&self, user: &UserRef, token: &AccessToken) -> Box<dyn ProjectImporter>;
}

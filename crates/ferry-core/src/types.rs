//! Value types shared by every import crate
//!
//! These are the pieces of an import request that travel through the job
//! queue, so they live here rather than next to the importer traits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Local user on whose behalf an import runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct UserRef {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl UserRef {
    pub fn new(id: i32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id: {})", self.username, self.id)
    }
}

/// Bearer credential for the external service.
///
/// Opaque to Ferry: it is handed to the importer exactly as received and is
/// never written to logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, for the importer that talks to the remote API
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

#[derive(Debug, Error)]
#[error("Unknown import source: {0}")]
pub struct UnknownImportSource(pub String);

/// External project-management service a project can be imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Github,
    Asana,
    Trello,
    Jira,
    Pivotal,
}

impl ImportSource {
    pub const ALL: [ImportSource; 5] = [
        ImportSource::Github,
        ImportSource::Asana,
        ImportSource::Trello,
        ImportSource::Jira,
        ImportSource::Pivotal,
    ];

    /// Identifier used in URLs and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Github => "github",
            ImportSource::Asana => "asana",
            ImportSource::Trello => "trello",
            ImportSource::Jira => "jira",
            ImportSource::Pivotal => "pivotal",
        }
    }

    /// Name as the service brands itself, for user-facing text
    pub fn display_name(&self) -> &'static str {
        match self {
            ImportSource::Github => "GitHub",
            ImportSource::Asana => "Asana",
            ImportSource::Trello => "Trello",
            ImportSource::Jira => "Jira",
            ImportSource::Pivotal => "Pivotal Tracker",
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportSource {
    type Err = UnknownImportSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(ImportSource::Github),
            "asana" => Ok(ImportSource::Asana),
            "trello" => Ok(ImportSource::Trello),
            "jira" => Ok(ImportSource::Jira),
            "pivotal" => Ok(ImportSource::Pivotal),
            _ => Err(UnknownImportSource(s.to_string())),
        }
    }
}

/// Named import toggles and parameters, handed to the importer unchanged.
///
/// Toggles are booleans (`"keep_external_reference": true`); parameters can be
/// any JSON value (`"template": "kanban"`, `"users_bindings": {...}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct ImportOptions(BTreeMap<String, serde_json::Value>);

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// True only when the option is present and set to boolean `true`
    pub fn flag(&self, key: &str) -> bool {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for ImportOptions {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, serde_json::Value)> for ImportOptions {
    fn from_iter<I: IntoIterator<Item = (K, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A request to import one external project for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub source: ImportSource,
    pub requesting_user: UserRef,
    pub access_token: AccessToken,
    pub external_project_id: String,
    pub options: ImportOptions,
}

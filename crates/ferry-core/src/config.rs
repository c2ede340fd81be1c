//! Import service configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

pub const ENV_EXECUTION_MODE: &str = "FERRY_IMPORT_MODE";
pub const ENV_WORKER_CONCURRENCY: &str = "FERRY_IMPORT_WORKER_CONCURRENCY";
pub const ENV_QUEUE_CAPACITY: &str = "FERRY_IMPORT_QUEUE_CAPACITY";
pub const ENV_NOTIFICATION_RETRIES: &str = "FERRY_IMPORT_NOTIFICATION_RETRIES";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Where import jobs run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// On the caller's task; the caller waits for the outcome
    #[default]
    Inline,
    /// On a queue worker; the caller only gets a job id back
    Queued,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Inline => f.write_str("inline"),
            ExecutionMode::Queued => f.write_str("queued"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" | "sync" => Ok(ExecutionMode::Inline),
            "queued" | "async" => Ok(ExecutionMode::Queued),
            other => Err(format!("expected one of inline, queued (got {})", other)),
        }
    }
}

/// Import job settings
/// All fields have sensible defaults for easy onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ImportSettings {
    pub execution_mode: ExecutionMode,
    /// Max imports a queue worker runs at the same time
    pub worker_concurrency: usize,
    /// Jobs the queue holds before submitters wait for room
    pub queue_capacity: usize,
    /// Extra delivery attempts for outcome notifications
    pub notification_retries: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::Inline,
            worker_concurrency: 4,
            queue_capacity: 1000,
            notification_retries: 0,
        }
    }
}

impl ImportSettings {
    /// Defaults overridden by `FERRY_IMPORT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(ENV_EXECUTION_MODE) {
            settings.execution_mode = parse_value(ENV_EXECUTION_MODE, &value)?;
        }
        if let Some(value) = lookup(ENV_WORKER_CONCURRENCY) {
            settings.worker_concurrency = parse_value(ENV_WORKER_CONCURRENCY, &value)?;
        }
        if let Some(value) = lookup(ENV_QUEUE_CAPACITY) {
            settings.queue_capacity = parse_value(ENV_QUEUE_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(ENV_NOTIFICATION_RETRIES) {
            settings.notification_retries = parse_value(ENV_NOTIFICATION_RETRIES, &value)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the worker and queue cannot run with.
    ///
    /// Settings built by hand or deserialized skip `from_lookup`, so anything
    /// that starts the import subsystem checks them again.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_WORKER_CONCURRENCY.to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_QUEUE_CAPACITY.to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

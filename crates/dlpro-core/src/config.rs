//! Engine configuration.
//!
//! Defaults cover every field; `from_env` layers `DLPRO_*` overrides on top.
//! Hosts may adjust fields further (e.g. from CLI flags) and must call
//! `validate` before building the engine.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::{PathError, bin_dir};

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 600;
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;
pub const DEFAULT_SELF_CHECK_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for fetching, provisioning and job execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Managed binaries directory; defaults to `<data root>/bin`.
    pub bin_dir: Option<PathBuf>,
    /// Timeout applied to each fetch attempt.
    pub fetch_timeout_secs: u64,
    /// Fetch attempts per artifact.
    pub fetch_attempts: u32,
    /// Backoff unit; attempt `n` waits `n * base` before the next one.
    pub retry_base_delay_ms: u64,
    /// Redirects followed before failing with a redirect loop.
    pub max_redirects: u32,
    pub user_agent: String,
    /// Time a cancelled tool gets to exit after SIGTERM before SIGKILL.
    pub shutdown_grace_ms: u64,
    /// Probe the converter with `-version` before its first job.
    pub converter_self_check: bool,
    pub self_check_timeout_secs: u64,
    /// Optional cap on concurrently running jobs.
    pub max_concurrent_jobs: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bin_dir: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: format!("dlpro/{}", env!("CARGO_PKG_VERSION")),
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
            converter_self_check: true,
            self_check_timeout_secs: DEFAULT_SELF_CHECK_TIMEOUT_SECS,
            max_concurrent_jobs: None,
        }
    }
}

impl EngineConfig {
    /// Defaults with `DLPRO_*` environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(dir) = get("DLPRO_BIN_DIR") {
            config.bin_dir = Some(PathBuf::from(dir));
        }
        if let Some(agent) = get("DLPRO_USER_AGENT") {
            config.user_agent = agent;
        }
        parse_into(&get, "DLPRO_FETCH_TIMEOUT_SECS", &mut config.fetch_timeout_secs)?;
        parse_into(&get, "DLPRO_FETCH_ATTEMPTS", &mut config.fetch_attempts)?;
        parse_into(&get, "DLPRO_RETRY_BASE_DELAY_MS", &mut config.retry_base_delay_ms)?;
        parse_into(&get, "DLPRO_MAX_REDIRECTS", &mut config.max_redirects)?;
        parse_into(&get, "DLPRO_SHUTDOWN_GRACE_MS", &mut config.shutdown_grace_ms)?;
        parse_into(&get, "DLPRO_SELF_CHECK_TIMEOUT_SECS", &mut config.self_check_timeout_secs)?;

        if let Some(raw) = get("DLPRO_SELF_CHECK") {
            config.converter_self_check = parse_bool("DLPRO_SELF_CHECK", &raw)?;
        }
        if let Some(raw) = get("DLPRO_MAX_JOBS") {
            let limit: usize = parse_value("DLPRO_MAX_JOBS", &raw)?;
            config.max_concurrent_jobs = (limit > 0).then_some(limit);
        }

        Ok(config)
    }

    /// Reject values that would disable fetching or job execution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_attempts == 0 {
            return Err(invalid("fetch_attempts", "must be at least 1"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(invalid("fetch_timeout_secs", "must be greater than 0"));
        }
        if self.self_check_timeout_secs == 0 {
            return Err(invalid("self_check_timeout_secs", "must be greater than 0"));
        }
        if self.max_concurrent_jobs == Some(0) {
            return Err(invalid("max_concurrent_jobs", "must be at least 1 when set"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "cannot be empty"));
        }
        Ok(())
    }

    /// The configured binaries directory, or the default under the data root.
    pub fn resolve_bin_dir(&self) -> Result<PathBuf, PathError> {
        match &self.bin_dir {
            Some(dir) => Ok(dir.clone()),
            None => bin_dir(),
        }
    }

    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[must_use]
    pub const fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    #[must_use]
    pub const fn self_check_timeout(&self) -> Duration {
        Duration::from_secs(self.self_check_timeout_secs)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_into<T, G>(get: &G, key: &str, slot: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(key) {
        *slot = parse_value(key, &raw)?;
    }
    Ok(())
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

//! Resilient artifact fetcher.
//!
//! Downloads a URL to a local path through `<dest>.tmp` and renames into
//! place, so the destination is only ever absent, the previous complete file,
//! or the new complete file. Redirects are followed manually so the hop count
//! can be capped and every hop shares one attempt timeout.

mod attempt;
mod retry;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use dlpro_core::{ArtifactFetcher, EngineConfig, FetchError};
use reqwest::Client;
use reqwest::redirect::Policy;

/// Tunables for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Timeout for one attempt, redirects included.
    pub timeout: Duration,
    pub attempts: u32,
    /// Attempt `n` waits `n * base_delay` before attempt `n + 1`.
    pub base_delay: Duration,
    pub max_redirects: u32,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for FetchSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            attempts: config.fetch_attempts,
            base_delay: config.retry_base_delay(),
            max_redirects: config.max_redirects,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP implementation of [`ArtifactFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    settings: FetchSettings,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| FetchError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    #[must_use]
    pub const fn settings(&self) -> &FetchSettings {
        &self.settings
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch_artifact(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.fetch_with_retry(url, dest).await
    }

    fn max_attempts(&self) -> u32 {
        self.settings.attempts.max(1)
    }
}

//! Artifact fetcher port.
//!
//! The provisioner downloads managed binaries through this trait so it can be
//! exercised without a network.

use std::path::Path;

use async_trait::async_trait;

use crate::errors::FetchError;

/// Retrieves a remote artifact to a local path.
///
/// Implementations must install atomically: after a call returns, `dest` is
/// either absent, its previous complete content, or the new complete content.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch `url` into `dest`, retrying transient failures.
    ///
    /// Returns the last error once every attempt has failed.
    async fn fetch_artifact(&self, url: &str, dest: &Path) -> Result<(), FetchError>;

    /// Number of attempts a single `fetch_artifact` call may make.
    fn max_attempts(&self) -> u32 {
        1
    }
}

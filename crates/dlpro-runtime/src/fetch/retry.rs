use std::path::Path;

use dlpro_core::{FetchError, is_ready};
use tracing::{debug, warn};

use super::HttpFetcher;

impl HttpFetcher {
    /// Fetch with bounded retries and linear backoff.
    ///
    /// A successful attempt must leave a non-empty file at `dest`. No delay
    /// follows the final attempt; the last error is returned.
    pub async fn fetch_with_retry(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let attempts = self.settings.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let result = match self.fetch(url, dest).await {
                Ok(()) if is_ready(dest) => Ok(()),
                Ok(()) => Err(FetchError::EmptyArtifact {
                    path: dest.display().to_string(),
                }),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    debug!(url = %url, attempt, "fetch succeeded");
                    return Ok(());
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    warn!(url = %url, attempt, attempts, error = %err, "fetch attempt failed");
                    last_error = Some(err);
                    if attempt < attempts {
                        tokio::time::sleep(self.settings.base_delay * attempt).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::network("no fetch attempt was made")))
    }
}

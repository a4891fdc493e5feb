//! Shared provisioning task.
//!
//! Every job submission awaits the same provisioning attempt. The attempt
//! runs at most once per [`SharedProvisioning`]; its report, including any
//! per-binary failures, is kept for the lifetime of the value.

use std::sync::Arc;

use dlpro_runtime::{ProvisionReport, Provisioner};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Lazily-initialized, memoized provisioning.
#[derive(Debug)]
pub struct SharedProvisioning {
    provisioner: Provisioner,
    report: OnceCell<Arc<ProvisionReport>>,
}

impl SharedProvisioning {
    pub fn new(provisioner: Provisioner) -> Self {
        Self {
            provisioner,
            report: OnceCell::new(),
        }
    }

    /// Await the provisioning report, starting provisioning if needed.
    ///
    /// Concurrent callers share one in-flight attempt.
    pub async fn ready(&self) -> Arc<ProvisionReport> {
        self.report
            .get_or_init(|| async {
                let report = self.provisioner.ensure_ready().await;
                if report.all_ready() {
                    info!(tools = report.ready.len(), "managed binaries ready");
                } else {
                    for (tool, err) in &report.failures {
                        warn!(tool = %tool, error = %err, "managed binary unavailable");
                    }
                }
                Arc::new(report)
            })
            .await
            .clone()
    }

    /// The report, if provisioning has already completed.
    pub fn report(&self) -> Option<Arc<ProvisionReport>> {
        self.report.get().cloned()
    }

    /// Start provisioning in the background.
    ///
    /// Failures are logged, never raised. The returned handle can be awaited
    /// or dropped.
    pub fn warm_up(self: &Arc<Self>) -> JoinHandle<()> {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let _ = shared.ready().await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use dlpro_core::{ArtifactFetcher, FetchError, ManagedBinary, ToolKind};

    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ArtifactFetcher for CountingFetcher {
        async fn fetch_artifact(&self, _url: &str, dest: &Path) -> Result<(), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            std::fs::write(dest, b"#!/bin/sh\n").map_err(FetchError::from)
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::default());
        let binaries = vec![ManagedBinary::executable(
            ToolKind::YtDlp,
            dir.path().join("yt-dlp"),
            "https://example.test/yt-dlp",
        )];
        let shared = Arc::new(SharedProvisioning::new(Provisioner::new(
            fetcher.clone(),
            binaries,
        )));
        assert!(shared.report().is_none());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move { shared.ready().await })
            })
            .collect();
        for handle in handles {
            let report = handle.await.unwrap();
            assert!(report.all_ready());
        }

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(shared.report().is_some());
    }

    #[tokio::test]
    async fn test_warm_up_populates_report() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher::default());
        let binaries = vec![ManagedBinary::executable(
            ToolKind::YtDlp,
            dir.path().join("yt-dlp"),
            "https://example.test/yt-dlp",
        )];
        let shared = Arc::new(SharedProvisioning::new(Provisioner::new(fetcher, binaries)));

        tokio_test::assert_ok!(shared.warm_up().await);
        let report = shared.report().unwrap();
        assert!(report.ready_path(ToolKind::YtDlp).is_some());
    }
}

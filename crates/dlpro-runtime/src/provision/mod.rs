//! Managed binary provisioner.
//!
//! Ensures every [`ManagedBinary`] exists under the managed directory,
//! downloading (and unpacking) it through an [`ArtifactFetcher`] on first
//! need. Already-ready binaries are never touched, which makes repeated
//! passes cheap and idempotent across restarts.

mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dlpro_core::{
    ArtifactFetcher, ManagedBinary, Packaging, ProvisionError, is_ready, platform_binaries,
};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::archive::extract_member;
use crate::cleanup::TempPathGuard;

pub use report::ProvisionReport;

/// Installs managed binaries on demand.
#[derive(Clone)]
pub struct Provisioner {
    fetcher: Arc<dyn ArtifactFetcher>,
    binaries: Vec<ManagedBinary>,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("binaries", &self.binaries)
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>, binaries: Vec<ManagedBinary>) -> Self {
        Self { fetcher, binaries }
    }

    /// Provisioner for this platform's binaries under `bin_dir`.
    pub fn for_platform(fetcher: Arc<dyn ArtifactFetcher>, bin_dir: &Path) -> Self {
        Self::new(fetcher, platform_binaries(bin_dir))
    }

    pub fn binaries(&self) -> &[ManagedBinary] {
        &self.binaries
    }

    /// Make every managed binary ready.
    ///
    /// Never fails as a whole: per-binary failures are logged and collected
    /// in the report.
    pub async fn ensure_ready(&self) -> ProvisionReport {
        let results = join_all(self.binaries.iter().map(|binary| async move {
            (binary.tool, self.provision_one(binary).await)
        }))
        .await;

        let mut report = ProvisionReport::default();
        for (tool, result) in results {
            match result {
                Ok(path) => {
                    report.ready.insert(tool, path);
                }
                Err(err) => {
                    warn!(tool = %tool, error = %err, "provisioning failed");
                    report.failures.insert(tool, err);
                }
            }
        }
        report
    }

    async fn provision_one(&self, binary: &ManagedBinary) -> Result<PathBuf, ProvisionError> {
        if binary.is_ready() {
            debug!(tool = %binary.tool, path = %binary.path.display(), "already installed");
            return Ok(binary.path.clone());
        }

        info!(tool = %binary.tool, url = %binary.source_url, "installing managed binary");
        if let Some(parent) = binary.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match &binary.packaging {
            Packaging::Executable => self.fetch(&binary.source_url, &binary.path).await?,
            Packaging::Archive { format, member } => {
                let archive_path = binary
                    .staging_archive_path()
                    .ok_or_else(|| ProvisionError::archive("no staging path for archive"))?;
                let archive = TempPathGuard::new(archive_path);
                self.fetch(&binary.source_url, archive.path()).await?;

                let archive_file = archive.path().to_path_buf();
                let (format, member, dest) = (*format, member.clone(), binary.path.clone());
                tokio::task::spawn_blocking(move || {
                    extract_member(&archive_file, format, &member, &dest)
                })
                .await
                .map_err(|e| ProvisionError::archive(format!("extraction task failed: {e}")))??;
            }
        }

        if !is_ready(&binary.path) {
            return Err(ProvisionError::not_installed(binary.tool, &binary.path));
        }
        make_executable(&binary.path)?;

        info!(tool = %binary.tool, path = %binary.path.display(), "managed binary ready");
        Ok(binary.path.clone())
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), ProvisionError> {
        self.fetcher
            .fetch_artifact(url, dest)
            .await
            .map_err(|source| ProvisionError::FetchExhausted {
                url: url.to_string(),
                attempts: self.fetcher.max_attempts(),
                source,
            })
    }
}

/// Mark an installed binary executable (0o755). No-op on Windows.
#[allow(clippy::unnecessary_wraps)]
fn make_executable(path: &Path) -> Result<(), ProvisionError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Engine configuration (environment plus flag overrides)
//! - HTTP fetcher and binary provisioner (via dlpro-runtime)
//! - Shared provisioning, event channel and orchestrator (via dlpro-jobs)

use std::path::PathBuf;
use std::sync::Arc;

use dlpro_core::{EngineConfig, JobEvent, ResolvedPaths};
use dlpro_jobs::{ChannelJobEmitter, JobOrchestrator, SharedProvisioning};
use dlpro_runtime::{FetchSettings, HttpFetcher, Provisioner};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::error::CliError;

/// Flag overrides applied on top of the environment configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub bin_dir: Option<PathBuf>,
    pub no_self_check: bool,
}

impl CliConfig {
    /// Resolve the engine configuration for this invocation.
    pub fn engine_config(&self) -> Result<EngineConfig, CliError> {
        let mut config = EngineConfig::from_env()?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut EngineConfig) {
        if let Some(dir) = &self.bin_dir {
            config.bin_dir = Some(dir.clone());
        }
        if self.no_self_check {
            config.converter_self_check = false;
        }
    }
}

/// Fully composed engine for CLI commands.
pub struct CliContext {
    pub config: EngineConfig,
    pub paths: ResolvedPaths,
    pub orchestrator: JobOrchestrator,
    /// Every event the orchestrator emits.
    pub events: UnboundedReceiver<JobEvent>,
}

impl CliContext {
    pub fn provisioning(&self) -> &Arc<SharedProvisioning> {
        self.orchestrator.provisioning()
    }
}

/// Bootstrap the CLI application.
///
/// Builds the fetcher, provisioner and orchestrator. Nothing is downloaded
/// until a command awaits provisioning.
pub fn bootstrap(cli: &CliConfig) -> Result<CliContext, CliError> {
    let config = cli.engine_config()?;
    let paths = ResolvedPaths::resolve_with_bin_dir(config.bin_dir.as_deref())?;
    debug!(bin_dir = %paths.bin_dir.display(), "resolved managed binaries directory");

    let fetcher = HttpFetcher::new(FetchSettings::from(&config))?;
    let provisioner = Provisioner::for_platform(Arc::new(fetcher), &paths.bin_dir);
    let provisioning = Arc::new(SharedProvisioning::new(provisioner));

    let (emitter, events) = ChannelJobEmitter::new();
    let orchestrator = JobOrchestrator::new(provisioning, Arc::new(emitter), &config);

    Ok(CliContext {
        config,
        paths,
        orchestrator,
        events,
    })
}

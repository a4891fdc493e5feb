//! Job orchestrator.
//!
//! # Lifecycle
//!
//! `submit_*` validates the request, awaits the shared provisioning attempt,
//! resolves the tool, registers the job (emitting `started`) and spawns the
//! runner task. It returns the id as soon as the job is registered.
//!
//! The runner task relays every output line as a `log` event, plus a
//! `progress` event when the line parses, and reports the outcome through
//! [`JobRegistry::finish`], which emits the terminal event. Cancellation
//! removes the entry and fires the job's token; the runner task stops the
//! tool and its terminal event is `canceled`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dlpro_core::{
    ConvertRequest, DownloadRequest, EngineConfig, JobEvent, JobEventEmitterPort, JobId, JobKind,
    JobOutcome, JobSummary, ProcessError, ProgressParser, RequestError, ToolKind,
};
use dlpro_runtime::{ProcessRunner, ProvisionReport, RunEvent, self_check};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::args::{convert_args, download_args};
use crate::provisioning::SharedProvisioning;
use crate::registry::JobRegistry;

/// Converter self-check settings.
#[derive(Debug, Clone, Copy)]
struct SelfCheck {
    enabled: bool,
    timeout: Duration,
}

/// Accepts job submissions and drives them to a terminal event.
///
/// Cheap to clone; clones share the registry and provisioning task.
#[derive(Debug, Clone)]
pub struct JobOrchestrator {
    registry: Arc<JobRegistry>,
    provisioning: Arc<SharedProvisioning>,
    runner: ProcessRunner,
    self_check: SelfCheck,
    converter_banner: Arc<OnceCell<String>>,
}

impl JobOrchestrator {
    pub fn new(
        provisioning: Arc<SharedProvisioning>,
        emitter: Arc<dyn JobEventEmitterPort>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            registry: Arc::new(JobRegistry::new(emitter, config.max_concurrent_jobs)),
            provisioning,
            runner: ProcessRunner::from(config),
            self_check: SelfCheck {
                enabled: config.converter_self_check,
                timeout: config.self_check_timeout(),
            },
            converter_banner: Arc::new(OnceCell::new()),
        }
    }

    pub fn provisioning(&self) -> &Arc<SharedProvisioning> {
        &self.provisioning
    }

    /// Start a media download.
    pub async fn submit_download(&self, request: DownloadRequest) -> Result<JobId, RequestError> {
        request.validate()?;

        let report = self.provisioning.ready().await;
        let downloader = ready_tool(&report, ToolKind::YtDlp)?;
        let converter = ready_tool(&report, ToolKind::Ffmpeg)?;

        let args = download_args(&request, &converter);
        let id = self.launch(JobKind::Download, downloader, args)?;
        info!(job_id = %id, url = %request.url, kind = %request.kind, "download submitted");
        Ok(id)
    }

    /// Start a media conversion.
    pub async fn submit_convert(&self, request: ConvertRequest) -> Result<JobId, RequestError> {
        request.validate()?;

        let report = self.provisioning.ready().await;
        let converter = ready_tool(&report, ToolKind::Ffmpeg)?;
        if self.self_check.enabled {
            self.check_converter(&converter).await?;
        }

        let args = convert_args(&request);
        let id = self.launch(JobKind::Convert, converter, args)?;
        info!(
            job_id = %id,
            input = %request.input_path.display(),
            output = %request.output_path.display(),
            profile = %request.profile,
            "conversion submitted"
        );
        Ok(id)
    }

    /// Cancel a running job. Returns `false` for unknown or finished ids.
    pub fn cancel(&self, id: JobId) -> bool {
        let cancelled = self.registry.cancel(id);
        if cancelled {
            info!(job_id = %id, "job cancelled");
        } else {
            debug!(job_id = %id, "cancel ignored for unknown job");
        }
        cancelled
    }

    /// Cancel every running job.
    pub fn cancel_all(&self) -> Vec<JobId> {
        let ids = self.registry.cancel_all();
        if !ids.is_empty() {
            info!(count = ids.len(), "cancelled all running jobs");
        }
        ids
    }

    pub fn list_jobs(&self) -> Vec<JobSummary> {
        self.registry.list()
    }

    pub fn is_running(&self, id: JobId) -> bool {
        self.registry.is_running(id)
    }

    /// Run the converter's self-check once; success is cached.
    async fn check_converter(&self, converter: &Path) -> Result<(), RequestError> {
        let timeout = self.self_check.timeout;
        match self
            .converter_banner
            .get_or_try_init(|| self_check(converter, timeout))
            .await
        {
            Ok(banner) => {
                debug!(%banner, "converter self-check passed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "converter self-check failed");
                Err(RequestError::ToolUnusable {
                    tool: ToolKind::Ffmpeg,
                    message: err.user_message(),
                })
            }
        }
    }

    fn launch(&self, kind: JobKind, program: PathBuf, args: Vec<String>) -> Result<JobId, RequestError> {
        let cancel = CancellationToken::new();
        let id = self.registry.register(kind, cancel.clone())?;

        let registry = Arc::clone(&self.registry);
        let runner = self.runner;
        tokio::spawn(async move {
            let outcome = run_job(&registry, runner, id, kind, &program, &args, &cancel).await;
            match registry.finish(id, outcome) {
                Some(JobOutcome::Error { message }) => {
                    warn!(job_id = %id, error = %message, "job failed");
                }
                Some(outcome) => debug!(job_id = %id, ?outcome, "job finished"),
                None => {}
            }
        });

        Ok(id)
    }
}

fn ready_tool(report: &ProvisionReport, tool: ToolKind) -> Result<PathBuf, RequestError> {
    report
        .ready_path(tool)
        .map(Path::to_path_buf)
        .ok_or(RequestError::ToolNotReady { tool })
}

async fn run_job(
    registry: &JobRegistry,
    runner: ProcessRunner,
    id: JobId,
    kind: JobKind,
    program: &Path,
    args: &[String],
    cancel: &CancellationToken,
) -> JobOutcome {
    if cancel.is_cancelled() {
        return JobOutcome::Canceled;
    }

    let mut parser = ProgressParser::for_kind(kind);
    let result = runner
        .run(program, args, cancel, |event| match event {
            RunEvent::Spawned { pid } => registry.set_pid(id, pid),
            RunEvent::Line(line) => {
                debug!(job_id = %id, line, "tool output");
                if let Some(update) = parser.feed(line) {
                    registry.emit_if_live(JobEvent::progress(id, &update));
                }
                registry.emit_if_live(JobEvent::log(id, line));
            }
        })
        .await;

    match result {
        Ok(()) => JobOutcome::Done,
        Err(ProcessError::Terminated) => JobOutcome::Canceled,
        Err(err) => JobOutcome::Error {
            message: err.user_message(),
        },
    }
}

//! Tool process runner.
//!
//! Spawns a managed tool headless, merges its stdout and stderr into one line
//! source and reports how it ended. Order is preserved within each stream;
//! lines from different streams may interleave arbitrarily.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use dlpro_core::{EngineConfig, ProcessError, SpawnError};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::lines::LineSplitter;
use super::shutdown::shutdown_child;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

const READ_CHUNK: usize = 8 * 1024;
const LINE_BUFFER: usize = 256;

/// Something the runner reports while a tool is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent<'a> {
    /// The child was spawned.
    Spawned { pid: Option<u32> },
    /// One non-blank output line from stdout or stderr.
    Line(&'a str),
}

/// Runs managed tools to completion or cancellation.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    shutdown_grace: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for ProcessRunner {
    fn from(config: &EngineConfig) -> Self {
        Self::new(config.shutdown_grace())
    }
}

enum Step {
    Line(String),
    Drained,
    Cancelled,
}

impl ProcessRunner {
    #[must_use]
    pub const fn new(shutdown_grace: Duration) -> Self {
        Self { shutdown_grace }
    }

    /// Run `program` with `args`, forwarding events synchronously to `on_event`.
    ///
    /// Returns `Ok(())` on exit status 0, `NonZeroExit` otherwise, and
    /// `Terminated` once `cancel` fires and the child has been shut down.
    pub async fn run<F>(
        &self,
        program: &Path,
        args: &[String],
        cancel: &CancellationToken,
        mut on_event: F,
    ) -> Result<(), ProcessError>
    where
        F: FnMut(RunEvent<'_>),
    {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command
            .spawn()
            .map_err(|e| SpawnError::from_io(program.display().to_string(), &e))?;
        let pid = child.id();
        debug!(program = %program.display(), ?pid, ?args, "tool spawned");
        on_event(RunEvent::Spawned { pid });

        let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);
        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(stdout, "stdout", tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(stderr, "stderr", tx.clone());
        }
        drop(tx);

        loop {
            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => Step::Cancelled,
                line = rx.recv() => line.map_or(Step::Drained, Step::Line),
            };
            match step {
                Step::Line(line) => on_event(RunEvent::Line(&line)),
                Step::Drained => break,
                Step::Cancelled => return Err(self.terminate(child).await),
            }
        }

        let waited = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            status = child.wait() => Some(status),
        };
        let Some(status) = waited else {
            return Err(self.terminate(child).await);
        };

        let status = status.map_err(|e| ProcessError::io(e.to_string()))?;
        debug!(program = %program.display(), ?pid, %status, "tool exited");
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::NonZeroExit {
                code: status.code(),
            })
        }
    }

    async fn terminate(&self, child: Child) -> ProcessError {
        let pid = child.id();
        match shutdown_child(child, self.shutdown_grace).await {
            Ok(status) => debug!(?pid, %status, "cancelled tool exited"),
            Err(e) => debug!(?pid, error = %e, "cancelled tool shutdown failed"),
        }
        ProcessError::Terminated
    }
}

fn spawn_line_reader(
    mut stream: impl AsyncRead + Unpin + Send + 'static,
    stream_type: &'static str,
    tx: mpsc::Sender<String>,
) {
    tokio::spawn(async move {
        let mut splitter = LineSplitter::new();
        let mut buf = vec![0u8; READ_CHUNK];

        loop {
            match stream.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    for line in splitter.push(&buf[..n]) {
                        if tx.send(line).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    debug!(%stream_type, error = %e, "output reader exiting due to read error");
                    break;
                }
            }
        }

        if let Some(line) = splitter.finish() {
            let _ = tx.send(line).await;
        }
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sh() -> PathBuf {
        PathBuf::from("/bin/sh")
    }

    fn script(body: &str) -> Vec<String> {
        vec!["-c".to_string(), body.to_string()]
    }

    #[tokio::test]
    async fn test_collects_both_streams() {
        let runner = ProcessRunner::default();
        let cancel = CancellationToken::new();
        let mut lines = Vec::new();
        let mut spawned = false;

        runner
            .run(
                &sh(),
                &script("echo out1; echo err1 >&2; printf 'p1\\rp2\\r'; echo; echo out2"),
                &cancel,
                |event| match event {
                    RunEvent::Spawned { pid } => spawned = pid.is_some(),
                    RunEvent::Line(line) => lines.push(line.to_string()),
                },
            )
            .await
            .unwrap();

        assert!(spawned);
        lines.sort();
        assert_eq!(lines, vec!["err1", "out1", "out2", "p1", "p2"]);
    }

    #[tokio::test]
    async fn test_non_zero_exit_code() {
        let runner = ProcessRunner::default();
        let err = runner
            .run(&sh(), &script("exit 3"), &CancellationToken::new(), |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, ProcessError::NonZeroExit { code: Some(3) });
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let runner = ProcessRunner::default();
        let err = runner
            .run(
                Path::new("/definitely/not/here/yt-dlp"),
                &[],
                &CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn(SpawnError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_cancel_terminates_child() {
        let runner = ProcessRunner::new(Duration::from_secs(2));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let started = std::time::Instant::now();
        let err = runner
            .run(&sh(), &script("echo ready; exec sleep 30"), &cancel, |event| {
                if matches!(event, RunEvent::Line("ready")) {
                    trigger.cancel();
                }
            })
            .await
            .unwrap_err();

        assert_eq!(err, ProcessError::Terminated);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}

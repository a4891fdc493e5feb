//! Tool self-check.

use std::path::Path;
use std::time::Duration;

use dlpro_core::ProcessError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::runner::{ProcessRunner, RunEvent};

/// Run `<program> -version` and return the first line it prints.
///
/// Fails with `SelfCheckTimeout` if the tool does not exit within `timeout`;
/// the probe process is killed in that case.
pub async fn self_check(program: &Path, timeout: Duration) -> Result<String, ProcessError> {
    let runner = ProcessRunner::new(Duration::from_millis(500));
    let cancel = CancellationToken::new();
    let args = vec!["-version".to_string()];
    let mut banner: Option<String> = None;

    let outcome = tokio::time::timeout(
        timeout,
        runner.run(program, &args, &cancel, |event| {
            if let RunEvent::Line(line) = event {
                if banner.is_none() {
                    banner = Some(line.to_string());
                }
            }
        }),
    )
    .await;

    match outcome {
        Ok(Ok(())) => {
            let banner = banner.unwrap_or_default();
            debug!(program = %program.display(), %banner, "self-check passed");
            Ok(banner)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ProcessError::SelfCheckTimeout {
            secs: timeout.as_secs().max(1),
        }),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_tool(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_self_check_returns_banner() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "echo 'ffmpeg version 7.0'; echo 'built with gcc'");

        let banner = self_check(&tool, Duration::from_secs(5)).await.unwrap();
        assert_eq!(banner, "ffmpeg version 7.0");
    }

    #[tokio::test]
    async fn test_self_check_failure_exit() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "exit 1");

        let err = self_check(&tool, Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(err, ProcessError::NonZeroExit { code: Some(1) });
    }

    #[tokio::test]
    async fn test_self_check_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "exec sleep 30");

        let err = self_check(&tool, Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, ProcessError::SelfCheckTimeout { .. }));
    }
}

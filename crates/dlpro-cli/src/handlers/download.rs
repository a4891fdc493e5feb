//! Download command handler.

use std::path::PathBuf;

use dlpro_core::{CookieSpec, DownloadRequest, MediaKind};
use tracing::{info, warn};

use super::watch::watch_job;
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the download command.
#[derive(Debug, Clone)]
pub struct DownloadArgs {
    pub url: String,
    pub kind: String,
    pub format: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub cookies_from_browser: Option<String>,
    pub cookies: Option<PathBuf>,
}

impl DownloadArgs {
    /// Translate CLI input into an engine request.
    ///
    /// The output directory defaults to the current working directory.
    pub fn into_request(self) -> Result<DownloadRequest, CliError> {
        let kind: MediaKind = self.kind.parse()?;
        let out_dir = match self.out_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        let mut request = DownloadRequest::new(self.url, kind, out_dir);
        if let Some(format) = self.format {
            if !kind.is_known_format(&format) {
                warn!(
                    %format,
                    known = ?kind.known_formats(),
                    "unrecognized {kind} format, passing it to yt-dlp unchanged"
                );
            }
            request = request.with_format(format);
        }
        if let Some(browser) = self.cookies_from_browser {
            request = request.with_cookies(CookieSpec::browser(browser));
        } else if let Some(file) = self.cookies {
            request = request.with_cookies(CookieSpec::file(file.to_string_lossy()));
        }
        Ok(request)
    }
}

/// Execute the download command and follow the job to completion.
pub async fn execute(ctx: &mut CliContext, args: DownloadArgs, verbose: bool) -> Result<(), CliError> {
    let request = args.into_request()?;
    if let Some(out_dir) = &request.out_dir {
        std::fs::create_dir_all(out_dir)?;
    }

    let id = ctx.orchestrator.submit_download(request).await?;
    info!(job_id = %id, "download started");
    watch_job(ctx, id, verbose).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlpro_core::{CookieSource, RequestError};

    fn args() -> DownloadArgs {
        DownloadArgs {
            url: "https://example.com/v".to_string(),
            kind: "audio".to_string(),
            format: None,
            out_dir: Some(PathBuf::from("/music")),
            cookies_from_browser: None,
            cookies: None,
        }
    }

    #[test]
    fn test_into_request() {
        let request = args().into_request().unwrap();
        assert_eq!(request.kind, MediaKind::Audio);
        assert_eq!(request.effective_format(), "mp3");
        assert_eq!(request.out_dir, Some(PathBuf::from("/music")));
        assert!(request.cookie_source().is_none());
    }

    #[test]
    fn test_unknown_format_is_passed_through() {
        let request = DownloadArgs {
            format: Some("flac".to_string()),
            ..args()
        }
        .into_request()
        .unwrap();
        assert_eq!(request.effective_format(), "flac");
    }

    #[test]
    fn test_cookie_file() {
        let request = DownloadArgs {
            cookies: Some(PathBuf::from("/tmp/cookies.txt")),
            ..args()
        }
        .into_request()
        .unwrap();
        assert_eq!(
            request.cookie_source(),
            Some(CookieSource::File(PathBuf::from("/tmp/cookies.txt")))
        );
    }

    #[test]
    fn test_unknown_kind() {
        let err = DownloadArgs {
            kind: "podcast".to_string(),
            ..args()
        }
        .into_request()
        .unwrap_err();
        let expected = CliError::from(RequestError::unsupported_kind("podcast"));
        assert_eq!(err.to_string(), expected.to_string());
        assert_eq!(err.exit_code(), 2);
    }
}

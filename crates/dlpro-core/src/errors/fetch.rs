use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::io_kind;

/// Failure of a single artifact fetch (or of the last retry attempt).
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    /// More redirects than the configured cap.
    #[error("Too many redirects ({limit}) starting at {url}")]
    RedirectLoop { url: String, limit: u32 },

    /// Non-success, non-redirect HTTP status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// Local file error while streaming or installing.
    #[error("I/O error ({kind}): {message}")]
    Io { kind: String, message: String },

    /// The attempt did not finish within its timeout.
    #[error("Timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },

    /// Transfer completed but the installed file is empty.
    #[error("Downloaded artifact is empty: {path}")]
    EmptyArtifact { path: String },

    /// Connection, TLS or body transfer failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The URL (or a redirect location) could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::Io {
            kind: io_kind(err),
            message: err.to_string(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// A malformed URL fails the same way every time.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidUrl { .. })
    }

    /// Message suitable for direct display.
    pub fn user_message(&self) -> String {
        match self {
            Self::RedirectLoop { .. } => {
                "The download server redirected too many times.".to_string()
            }
            Self::HttpStatus { status, .. } => {
                format!("The download server responded with HTTP {status}.")
            }
            Self::Io { message, .. } => format!("Could not write the downloaded file: {message}"),
            Self::Timeout { secs, .. } => {
                format!("The download did not finish within {secs} seconds.")
            }
            Self::EmptyArtifact { .. } => "The downloaded file was empty.".to_string(),
            Self::Network { message } => format!("Network problem: {message}"),
            Self::InvalidUrl { url, .. } => format!("Invalid download address: {url}"),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_error_captures_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = FetchError::from(io);
        assert_eq!(
            err,
            FetchError::Io {
                kind: "PermissionDenied".to_string(),
                message: "denied".to_string(),
            }
        );
    }

    #[test]
    fn test_retryable() {
        assert!(FetchError::http_status("u", 500).is_retryable());
        assert!(FetchError::network("reset").is_retryable());
        assert!(!FetchError::invalid_url("::", "bad").is_retryable());
    }

    #[test]
    fn test_display_and_user_message() {
        let err = FetchError::http_status("https://x/y", 404);
        assert_eq!(err.to_string(), "HTTP 404 fetching https://x/y");
        assert!(err.user_message().contains("404"));
    }
}

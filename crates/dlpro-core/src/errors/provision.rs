use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{FetchError, io_kind};
use crate::domain::ToolKind;

/// Failure to install one managed binary.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProvisionError {
    /// The archive did not contain an entry matching the selector.
    #[error("Archive {archive} has no member matching {member}")]
    MissingArchiveMember { archive: String, member: String },

    /// Every fetch attempt failed; carries the last error.
    #[error("Fetching {url} failed after {attempts} attempt(s): {source}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    /// The archive could not be read.
    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("I/O error ({kind}): {message}")]
    Io { kind: String, message: String },

    /// The binary is still missing or empty after installation.
    #[error("{tool} is not installed at {path}")]
    NotInstalled { tool: ToolKind, path: String },
}

impl ProvisionError {
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::Io {
            kind: io_kind(err),
            message: err.to_string(),
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    pub fn missing_member(archive: impl Into<String>, member: impl Into<String>) -> Self {
        Self::MissingArchiveMember {
            archive: archive.into(),
            member: member.into(),
        }
    }

    pub fn not_installed(tool: ToolKind, path: &std::path::Path) -> Self {
        Self::NotInstalled {
            tool,
            path: path.display().to_string(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::MissingArchiveMember { member, .. } => {
                format!("The downloaded package did not contain {member}.")
            }
            Self::FetchExhausted { source, .. } => source.user_message(),
            Self::Archive { message } => format!("The downloaded package is damaged: {message}"),
            Self::Io { message, .. } => format!("Could not install the tool: {message}"),
            Self::NotInstalled { tool, .. } => {
                format!("{tool} could not be installed. Check your connection and try again.")
            }
        }
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_exhausted_exposes_source() {
        let err = ProvisionError::FetchExhausted {
            url: "https://x".to_string(),
            attempts: 3,
            source: FetchError::http_status("https://x", 503),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("3 attempt(s)"));
        assert!(err.user_message().contains("503"));
    }

    #[test]
    fn test_not_installed_display() {
        let err = ProvisionError::not_installed(ToolKind::Ffmpeg, std::path::Path::new("/b/ffmpeg"));
        assert_eq!(err.to_string(), "ffmpeg is not installed at /b/ffmpeg");
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ToolKind;

/// A job submission was rejected before any process started.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestError {
    #[error("Unsupported media kind '{kind}'")]
    UnsupportedKind { kind: String },

    #[error("A URL is required")]
    MissingUrl,

    #[error("An output directory is required")]
    MissingOutputDir,

    #[error("Input file not found: {path}")]
    MissingInput { path: String },

    #[error("An output path is required")]
    MissingOutput,

    /// The tool is missing or empty under the managed directory.
    #[error("{tool} is not ready")]
    ToolNotReady { tool: ToolKind },

    /// The tool is present but failed its self-check.
    #[error("{tool} failed its self-check: {message}")]
    ToolUnusable { tool: ToolKind, message: String },

    #[error("Too many running jobs (limit {limit})")]
    TooManyJobs { limit: usize },
}

impl RequestError {
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedKind { kind: kind.into() }
    }

    pub fn missing_input(path: &Path) -> Self {
        Self::MissingInput {
            path: path.display().to_string(),
        }
    }

    #[must_use]
    pub const fn tool_not_ready(tool: ToolKind) -> Self {
        Self::ToolNotReady { tool }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedKind { kind } => {
                format!("'{kind}' is not a supported media type. Choose video or audio.")
            }
            Self::MissingUrl => "Enter the address of the media to download.".to_string(),
            Self::MissingOutputDir => "Choose a folder to save the download in.".to_string(),
            Self::MissingInput { path } => format!("The file {path} does not exist."),
            Self::MissingOutput => "Choose where to save the converted file.".to_string(),
            Self::ToolNotReady { tool } => {
                format!("{tool} is not installed yet. Run provisioning and try again.")
            }
            Self::ToolUnusable { tool, .. } => {
                format!("{tool} is installed but does not run on this system.")
            }
            Self::TooManyJobs { limit } => {
                format!("Only {limit} jobs can run at once. Wait for one to finish.")
            }
        }
    }
}

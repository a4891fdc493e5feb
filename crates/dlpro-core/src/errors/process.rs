use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The executable could not be started.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpawnError {
    #[error("Executable not found: {program}")]
    NotFound { program: String },

    #[error("Permission denied starting {program}")]
    PermissionDenied { program: String },

    #[error("Failed to start {program}: {message}")]
    Io { program: String, message: String },
}

impl SpawnError {
    /// Classify a spawn failure by its I/O error kind.
    pub fn from_io(program: impl Into<String>, err: &std::io::Error) -> Self {
        let program = program.into();
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound { program },
            ErrorKind::PermissionDenied => Self::PermissionDenied { program },
            _ => Self::Io {
                program,
                message: err.to_string(),
            },
        }
    }
}

/// Outcome of a process run other than success.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProcessError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// Exit status was non-zero. `code` is absent when killed by a signal.
    #[error("{}", describe_exit(.code))]
    NonZeroExit { code: Option<i32> },

    /// The run was cancelled and the child terminated.
    #[error("Process terminated")]
    Terminated,

    #[error("Process I/O error: {message}")]
    Io { message: String },

    /// A self-check probe did not answer in time.
    #[error("Self-check timed out after {secs}s")]
    SelfCheckTimeout { secs: u64 },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("Process exited with code {code}"),
        None => "Process was killed by a signal".to_string(),
    }
}

impl ProcessError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Spawn(SpawnError::NotFound { program }) => {
                format!("The tool {program} is missing. Try provisioning again.")
            }
            Self::Spawn(SpawnError::PermissionDenied { program }) => {
                format!("The tool {program} is not executable.")
            }
            Self::Spawn(SpawnError::Io { message, .. }) => {
                format!("The tool could not be started: {message}")
            }
            Self::NonZeroExit { code: Some(code) } => format!("The tool failed with exit code {code}."),
            Self::NonZeroExit { code: None } => "The tool was stopped unexpectedly.".to_string(),
            Self::Terminated => "The job was cancelled.".to_string(),
            Self::Io { message } => format!("Lost contact with the tool: {message}"),
            Self::SelfCheckTimeout { secs } => {
                format!("The tool did not respond within {secs} seconds.")
            }
        }
    }
}

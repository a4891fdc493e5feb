//! CLI-specific error types and mappings.
//!
//! Engine errors are mapped to exit codes and user-facing messages here.

use dlpro_core::{ConfigError, FetchError, PathError, RequestError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The engine rejected a request.
    #[error("{0}")]
    Request(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more managed binaries could not be installed.
    #[error("Provisioning failed: {0}")]
    Provision(String),

    /// The job's tool failed.
    #[error("Job failed: {0}")]
    Job(String),

    /// The job was cancelled from the terminal.
    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    /// - 130: Interrupted by Ctrl-C
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Request(_) | Self::Job(_) => 1,
            Self::Arguments(_) => 2,
            Self::Provision(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,        // EX_IOERR
            Self::Config(_) => 78,    // EX_CONFIG
            Self::Cancelled => 130,
        }
    }
}

impl From<RequestError> for CliError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::UnsupportedKind { .. } => Self::Arguments(err.user_message()),
            RequestError::ToolNotReady { .. } | RequestError::ToolUnusable { .. } => {
                Self::Provision(err.user_message())
            }
            _ => Self::Request(err.user_message()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        Self::Config(err.user_message())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

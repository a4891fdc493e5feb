//! Core domain types and port definitions for dlpro.
//!
//! This crate holds everything the engine shares across adapters without
//! pulling in any infrastructure: managed binary descriptors, job and request
//! types, the event union, error taxonomy, configuration, path resolution and
//! the pure progress parsers.
//!
//! Infrastructure (HTTP, archives, subprocesses) lives in `dlpro-runtime`;
//! job orchestration lives in `dlpro-jobs`.

#![deny(unsafe_code)]

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod paths;
pub mod ports;
pub mod progress;

// Re-export commonly used types for convenience
pub use config::{ConfigError, EngineConfig};
pub use domain::{
    ArchiveFormat, ConversionProfile, ConvertRequest, CookieSource, CookieSpec, DownloadRequest,
    JobId, JobKind, JobStatus, JobSummary, ManagedBinary, MediaKind, MemberSelector, Packaging,
    ToolKind, is_ready, platform_binaries,
};
pub use errors::{FetchError, ProcessError, ProvisionError, RequestError, SpawnError};
pub use events::{JobEvent, JobOutcome};
pub use paths::{
    DATA_DIR_ENV, PathError, ResolvedPaths, bin_dir, bin_dir_in, data_root, ensure_directory,
    tool_path, tool_path_in,
};
pub use ports::{ArtifactFetcher, JobEventEmitterPort, NoopJobEmitter};
pub use progress::{FfmpegProgressTracker, ProgressParser, ProgressUpdate, parse_progress_line};

//! Domain types for the job engine.
//!
//! - `binary` - managed external tools and how they are packaged
//! - `job` - job identity, kind and lifecycle status
//! - `request` - download and convert submissions

mod binary;
mod job;
mod request;

pub use binary::{
    ArchiveFormat, ManagedBinary, MemberSelector, Packaging, ToolKind, is_ready, platform_binaries,
};
pub use job::{JobId, JobKind, JobStatus, JobSummary};
pub use request::{
    ConversionProfile, ConvertRequest, CookieSource, CookieSpec, DownloadRequest, MediaKind,
};

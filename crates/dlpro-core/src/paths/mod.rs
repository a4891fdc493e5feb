//! Path resolution for dlpro data directories.
//!
//! - Data root (`DLPRO_DATA_DIR` or the platform local data directory)
//! - Managed binaries directory and per-tool executable paths
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Environment lookups are isolated in `platform`; everything else is pure

mod binaries;
mod ensure;
mod error;
mod platform;
mod resolver;

pub use binaries::{bin_dir, bin_dir_in, tool_path, tool_path_in};
pub use ensure::ensure_directory;
pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root};
pub use resolver::ResolvedPaths;

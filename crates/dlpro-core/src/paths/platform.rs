//! Platform-specific data root resolution.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "DLPRO_DATA_DIR";

const APP_DIR_NAME: &str = "dlpro";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `DLPRO_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/dlpro`)
pub fn data_root() -> Result<PathBuf, PathError> {
    resolve_data_root(env::var_os(DATA_DIR_ENV), dirs::data_local_dir())
}

pub(super) fn resolve_data_root(
    override_dir: Option<OsString>,
    system_dir: Option<PathBuf>,
) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    system_dir
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(PathError::NoDataDir)
}

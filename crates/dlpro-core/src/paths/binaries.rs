//! Managed binaries directory layout.

use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::data_root;
use crate::domain::ToolKind;

const BIN_DIR_NAME: &str = "bin";

/// `<data root>/bin`.
pub fn bin_dir() -> Result<PathBuf, PathError> {
    Ok(bin_dir_in(&data_root()?))
}

#[must_use]
pub fn bin_dir_in(data_root: &Path) -> PathBuf {
    data_root.join(BIN_DIR_NAME)
}

/// Platform-appropriate executable path for a tool under the default bin dir.
pub fn tool_path(tool: ToolKind) -> Result<PathBuf, PathError> {
    Ok(tool_path_in(&bin_dir()?, tool))
}

#[must_use]
pub fn tool_path_in(bin_dir: &Path, tool: ToolKind) -> PathBuf {
    bin_dir.join(tool.executable_name())
}

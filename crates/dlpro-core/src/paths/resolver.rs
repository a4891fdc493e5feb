//! Resolved path snapshot for CLI introspection.

use std::path::{Path, PathBuf};

use super::{PathError, bin_dir_in, data_root, tool_path_in};
use crate::domain::ToolKind;

/// All resolved paths captured in a single struct.
///
/// Backs the `dlpro paths` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Root directory for application data.
    pub data_root: PathBuf,
    /// Managed binaries directory.
    pub bin_dir: PathBuf,
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
}

impl ResolvedPaths {
    /// Resolve all paths using the current environment.
    pub fn resolve() -> Result<Self, PathError> {
        let root = data_root()?;
        let bin_dir = bin_dir_in(&root);
        Ok(Self::from_dirs(root, bin_dir))
    }

    /// Resolve with an explicit binaries directory (e.g. from configuration).
    pub fn resolve_with_bin_dir(bin_dir: Option<&Path>) -> Result<Self, PathError> {
        let root = data_root()?;
        let bin_dir = bin_dir.map_or_else(|| bin_dir_in(&root), Path::to_path_buf);
        Ok(Self::from_dirs(root, bin_dir))
    }

    #[must_use]
    pub fn from_dirs(data_root: PathBuf, bin_dir: PathBuf) -> Self {
        Self {
            ytdlp_path: tool_path_in(&bin_dir, ToolKind::YtDlp),
            ffmpeg_path: tool_path_in(&bin_dir, ToolKind::Ffmpeg),
            data_root,
            bin_dir,
        }
    }
}

impl std::fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "data_root = {}", self.data_root.display())?;
        writeln!(f, "bin_dir = {}", self.bin_dir.display())?;
        writeln!(f, "yt_dlp = {}", self.ytdlp_path.display())?;
        write!(f, "ffmpeg = {}", self.ffmpeg_path.display())
    }
}

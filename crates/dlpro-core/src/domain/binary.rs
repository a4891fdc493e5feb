//! Managed binary descriptors.
//!
//! A `ManagedBinary` describes one external executable the engine drives:
//! where it lives on disk, where it is fetched from, and how to pull it out of
//! a packaged artifact. Descriptors are created once per installation and are
//! never mutated.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::tool_path_in;

const YT_DLP_RELEASE_BASE: &str = "https://github.com/yt-dlp/yt-dlp/releases/latest/download/";
const FFMPEG_RELEASE_BASE: &str =
    "https://github.com/BtbN/FFmpeg-Builds/releases/latest/download/ffmpeg-master-latest-";

/// Logical identity of a managed external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    /// The media downloader.
    YtDlp,
    /// The media converter (also used by the downloader for merging).
    Ffmpeg,
}

impl ToolKind {
    /// Every managed tool, in provisioning order.
    pub const ALL: [Self; 2] = [Self::YtDlp, Self::Ffmpeg];

    /// Logical name used in logs, events and the binaries directory.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YtDlp => "yt-dlp",
            Self::Ffmpeg => "ffmpeg",
        }
    }

    /// Platform-appropriate executable file name (`.exe` suffix on Windows).
    #[must_use]
    pub fn executable_name(self) -> String {
        format!("{}{}", self.as_str(), std::env::consts::EXE_SUFFIX)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container format of a packaged artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarXz,
}

impl ArchiveFormat {
    /// Guess the archive format from a URL or file name.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let lower = lower.split(['?', '#']).next().unwrap_or_default();
        if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            Some(Self::TarXz)
        } else {
            None
        }
    }

    /// File extension used for the temporary archive on disk.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
            Self::TarXz => "tar.xz",
        }
    }
}

/// Predicate selecting the archive member that holds the executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MemberSelector {
    /// Case-insensitive match on trailing path components, e.g. `bin/ffmpeg.exe`
    /// matches `ffmpeg-master-latest-win64-gpl/bin/ffmpeg.exe`.
    PathSuffix(String),
    /// Case-insensitive match on the full member path.
    ExactPath(String),
}

impl MemberSelector {
    /// Convenience constructor for the common suffix selector.
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::PathSuffix(suffix.into())
    }

    /// Whether an archive entry name satisfies this selector.
    ///
    /// Entry names are normalized to forward slashes before comparison.
    pub fn matches(&self, entry_name: &str) -> bool {
        let entry = entry_name.replace('\\', "/").to_ascii_lowercase();
        let entry = entry.trim_start_matches("./");
        match self {
            Self::PathSuffix(suffix) => {
                let suffix = suffix.replace('\\', "/").to_ascii_lowercase();
                let suffix = suffix.trim_start_matches('/');
                !suffix.is_empty()
                    && (entry == suffix || entry.ends_with(&format!("/{suffix}")))
            }
            Self::ExactPath(path) => {
                let path = path.replace('\\', "/").to_ascii_lowercase();
                entry == path.trim_start_matches("./")
            }
        }
    }
}

impl fmt::Display for MemberSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathSuffix(suffix) => write!(f, "*/{suffix}"),
            Self::ExactPath(path) => f.write_str(path),
        }
    }
}

/// How a managed binary is delivered by its source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Packaging {
    /// The URL yields the executable itself.
    Executable,
    /// The URL yields an archive containing the executable.
    Archive {
        format: ArchiveFormat,
        member: MemberSelector,
    },
}

/// One external executable under the managed binaries directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedBinary {
    /// Logical tool identity.
    pub tool: ToolKind,
    /// Final location of the executable.
    pub path: PathBuf,
    /// Remote source of the executable or its archive.
    pub source_url: String,
    /// How the artifact is packaged.
    pub packaging: Packaging,
}

impl ManagedBinary {
    /// Describe a binary delivered directly as an executable.
    pub fn executable(tool: ToolKind, path: impl Into<PathBuf>, source_url: impl Into<String>) -> Self {
        Self {
            tool,
            path: path.into(),
            source_url: source_url.into(),
            packaging: Packaging::Executable,
        }
    }

    /// Describe a binary delivered inside an archive.
    pub fn archived(
        tool: ToolKind,
        path: impl Into<PathBuf>,
        source_url: impl Into<String>,
        format: ArchiveFormat,
        member: MemberSelector,
    ) -> Self {
        Self {
            tool,
            path: path.into(),
            source_url: source_url.into(),
            packaging: Packaging::Archive { format, member },
        }
    }

    /// A binary is ready iff its path exists and has non-zero size.
    pub fn is_ready(&self) -> bool {
        is_ready(&self.path)
    }

    /// Where the downloaded archive is staged before extraction.
    ///
    /// Returns `None` for binaries delivered as plain executables.
    pub fn staging_archive_path(&self) -> Option<PathBuf> {
        match &self.packaging {
            Packaging::Executable => None,
            Packaging::Archive { format, .. } => Some(self.path.with_file_name(format!(
                "{}-download.{}",
                self.tool.as_str(),
                format.extension()
            ))),
        }
    }
}

/// Check that `path` is an existing regular file with non-zero size.
pub fn is_ready(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// The platform-specific set of managed binaries rooted at `bin_dir`.
pub fn platform_binaries(bin_dir: &Path) -> Vec<ManagedBinary> {
    #[cfg(target_os = "windows")]
    let (ytdlp_asset, ffmpeg_asset, ffmpeg_member) =
        ("yt-dlp.exe", "win64-gpl.zip", "bin/ffmpeg.exe");

    #[cfg(not(target_os = "windows"))]
    let (ytdlp_asset, ffmpeg_asset, ffmpeg_member) =
        ("yt-dlp", "linux64-gpl.tar.xz", "bin/ffmpeg");

    let ffmpeg_url = format!("{FFMPEG_RELEASE_BASE}{ffmpeg_asset}");
    let ffmpeg_format = ArchiveFormat::from_name(&ffmpeg_url).unwrap_or(ArchiveFormat::Zip);

    vec![
        ManagedBinary::executable(
            ToolKind::YtDlp,
            tool_path_in(bin_dir, ToolKind::YtDlp),
            format!("{YT_DLP_RELEASE_BASE}{ytdlp_asset}"),
        ),
        ManagedBinary::archived(
            ToolKind::Ffmpeg,
            tool_path_in(bin_dir, ToolKind::Ffmpeg),
            ffmpeg_url,
            ffmpeg_format,
            MemberSelector::suffix(ffmpeg_member),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_selector_matches_nested_member() {
        let selector = MemberSelector::suffix("bin/ffmpeg.exe");
        assert!(selector.matches("ffmpeg-master-latest-win64-gpl/bin/ffmpeg.exe"));
        assert!(selector.matches("FFMPEG-X/BIN/FFMPEG.EXE"));
        assert!(selector.matches("ffmpeg-x\\bin\\ffmpeg.exe"));
        assert!(!selector.matches("ffmpeg-x/bin/ffprobe.exe"));
        assert!(!selector.matches("ffmpeg-x/sbin/ffmpeg.exe"));
    }

    #[test]
    fn test_empty_suffix_never_matches() {
        assert!(!MemberSelector::suffix("").matches("anything"));
    }

    #[test]
    fn test_exact_selector() {
        let selector = MemberSelector::ExactPath("pkg/bin/ffmpeg".to_string());
        assert!(selector.matches("./pkg/bin/ffmpeg"));
        assert!(!selector.matches("other/pkg/bin/ffmpeg"));
    }

    #[test]
    fn test_archive_format_from_name() {
        assert_eq!(ArchiveFormat::from_name("a/b.ZIP"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_name("x.tar.xz"), Some(ArchiveFormat::TarXz));
        assert_eq!(ArchiveFormat::from_name("x.tgz?raw=1"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_name("yt-dlp.exe"), None);
    }

    #[test]
    fn test_readiness_requires_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool");
        assert!(!is_ready(&path));

        fs::write(&path, b"").unwrap();
        assert!(!is_ready(&path));

        fs::write(&path, b"#!/bin/sh\n").unwrap();
        assert!(is_ready(&path));

        assert!(!is_ready(dir.path()));
    }

    #[test]
    fn test_platform_binaries_layout() {
        let bin_dir = Path::new("/data/bin");
        let binaries = platform_binaries(bin_dir);
        assert_eq!(binaries.len(), 2);

        let ytdlp = &binaries[0];
        assert_eq!(ytdlp.tool, ToolKind::YtDlp);
        assert_eq!(ytdlp.packaging, Packaging::Executable);
        assert!(ytdlp.path.starts_with(bin_dir));
        assert!(ytdlp.staging_archive_path().is_none());

        let ffmpeg = &binaries[1];
        assert!(matches!(ffmpeg.packaging, Packaging::Archive { .. }));
        let staging = ffmpeg.staging_archive_path().unwrap();
        assert_eq!(staging.parent(), Some(bin_dir));
    }
}

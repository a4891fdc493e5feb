//! Progress parsing for managed tool output.
//!
//! Parsers are pure text transforms: they never touch processes or I/O.
//! Lines that do not carry progress yield `None` and are still forwarded to
//! hosts as log lines by the orchestrator.

mod ffmpeg;
mod ytdlp;

use serde::{Deserialize, Serialize};

use crate::domain::JobKind;

pub use ffmpeg::FfmpegProgressTracker;
pub use ytdlp::parse_progress_line;

/// Structured progress extracted from one output line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Raw percentage as printed by the tool; not range-checked.
    pub percent: Option<f64>,
    /// Rate token such as `1.2MiB` or `2.5x`; empty when unknown.
    pub speed: String,
    /// Remaining time token such as `00:08`; empty when unknown.
    pub eta: String,
}

impl ProgressUpdate {
    /// Percentage clamped to `0..=100`.
    #[must_use]
    pub fn clamped_percent(&self) -> Option<f64> {
        self.percent
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0))
    }
}

/// Per-job progress parser, chosen by job kind.
#[derive(Debug, Clone)]
pub enum ProgressParser {
    /// Stateless `[download]` line parser.
    YtDlp,
    /// Stateful converter tracker (needs the media duration header).
    Ffmpeg(FfmpegProgressTracker),
}

impl ProgressParser {
    #[must_use]
    pub fn for_kind(kind: JobKind) -> Self {
        match kind {
            JobKind::Download => Self::YtDlp,
            JobKind::Convert => Self::Ffmpeg(FfmpegProgressTracker::new()),
        }
    }

    /// Feed one output line, returning progress when the line carries any.
    pub fn feed(&mut self, line: &str) -> Option<ProgressUpdate> {
        match self {
            Self::YtDlp => parse_progress_line(line),
            Self::Ffmpeg(tracker) => tracker.feed(line),
        }
    }
}

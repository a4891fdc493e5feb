use std::sync::LazyLock;

use regex::Regex;

use super::ProgressUpdate;

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)")
        .expect("Failed to compile ffmpeg duration regex")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\btime=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)")
        .expect("Failed to compile ffmpeg time regex")
});

static SPEED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bspeed=\s*(\d+(?:\.\d+)?)x")
        .expect("Failed to compile ffmpeg speed regex")
});

/// Stateful converter progress tracker.
///
/// The converter prints the input duration once in its header and then
/// periodic `time=... speed=...x` status lines. Percent is only known after
/// the duration has been seen.
#[derive(Debug, Clone, Default)]
pub struct FfmpegProgressTracker {
    duration_secs: Option<f64>,
}

impl FfmpegProgressTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duration_secs: None,
        }
    }

    /// Media duration captured from the header, if any.
    #[must_use]
    pub const fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Feed one line. Header lines update state and yield `None`.
    pub fn feed(&mut self, line: &str) -> Option<ProgressUpdate> {
        if self.duration_secs.is_none() {
            if let Some(duration) = capture_timestamp(&DURATION, line) {
                if duration > 0.0 {
                    self.duration_secs = Some(duration);
                }
                return None;
            }
        }

        let elapsed = capture_timestamp(&TIME, line)?;
        let speed = SPEED
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());

        let percent = self.duration_secs.map(|total| elapsed / total * 100.0);
        let eta = match (self.duration_secs, speed) {
            (Some(total), Some(speed)) if speed > 0.0 => {
                format_clock(((total - elapsed).max(0.0)) / speed)
            }
            _ => String::new(),
        };

        Some(ProgressUpdate {
            percent,
            speed: speed.map(|s| format!("{s}x")).unwrap_or_default(),
            eta,
        })
    }
}

fn capture_timestamp(re: &Regex, line: &str) -> Option<f64> {
    let caps = re.captures(line)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(hours.mul_add(3600.0, minutes * 60.0) + seconds)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn format_clock(secs: f64) -> String {
    let total = secs.round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "  Duration: 00:01:40.00, start: 0.000000, bitrate: 1205 kb/s";
    const STATUS: &str =
        "frame= 1200 fps=240 q=-1.0 size=    5120kB time=00:00:25.00 bitrate=1677.7kbits/s speed=2.5x";

    #[test]
    fn test_patterns_compile() {
        for re in [&DURATION, &TIME, &SPEED] {
            LazyLock::force(re);
        }
    }

    #[test]
    fn test_header_sets_duration() {
        let mut tracker = FfmpegProgressTracker::new();
        assert_eq!(tracker.feed(HEADER), None);
        assert_eq!(tracker.duration_secs(), Some(100.0));
    }

    #[test]
    fn test_status_with_duration() {
        let mut tracker = FfmpegProgressTracker::new();
        tracker.feed(HEADER);

        let update = tracker.feed(STATUS).unwrap();
        assert_eq!(update.percent, Some(25.0));
        assert_eq!(update.speed, "2.5x");
        // 75s of media left at 2.5x
        assert_eq!(update.eta, "00:00:30");
    }

    #[test]
    fn test_status_without_duration() {
        let mut tracker = FfmpegProgressTracker::new();
        let update = tracker.feed(STATUS).unwrap();
        assert_eq!(update.percent, None);
        assert_eq!(update.speed, "2.5x");
        assert_eq!(update.eta, "");
    }

    #[test]
    fn test_unrelated_lines() {
        let mut tracker = FfmpegProgressTracker::new();
        assert_eq!(tracker.feed("Input #0, matroska,webm, from 'in.mkv':"), None);
        assert_eq!(tracker.feed("size=N/A time=N/A bitrate=N/A speed=N/A"), None);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(3725.4), "01:02:05");
        assert_eq!(format_clock(0.0), "00:00:00");
    }
}

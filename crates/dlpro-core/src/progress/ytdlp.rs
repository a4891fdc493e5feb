use std::sync::LazyLock;

use regex::Regex;

use super::ProgressUpdate;

static DOWNLOAD_PROGRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[download\]\s+(\d+(?:\.\d+)?)%(?:.*?\bat\s+(\S+?)/s)?(?:.*?\bETA\s+(\S+))?")
        .expect("Failed to compile download progress regex")
});

/// Parse a downloader status line such as
/// `[download]  42.5% of 10MiB at 1.2MiB/s ETA 00:08`.
///
/// The percentage is mandatory; rate and ETA default to empty strings.
pub fn parse_progress_line(line: &str) -> Option<ProgressUpdate> {
    let caps = DOWNLOAD_PROGRESS.captures(line)?;
    let percent = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let token = |idx: usize| {
        caps.get(idx)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    Some(ProgressUpdate {
        percent: Some(percent),
        speed: token(2),
        eta: token(3),
    })
}

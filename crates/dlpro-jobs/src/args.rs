//! Argument vectors for the managed tools.

use std::path::Path;

use dlpro_core::{ConvertRequest, CookieSource, DownloadRequest, MediaKind};

/// Output filename template handed to yt-dlp.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Build the yt-dlp argument vector for a validated download request.
///
/// `--newline` makes every progress update its own line, which keeps the
/// progress parser line-oriented.
pub fn download_args(request: &DownloadRequest, ffmpeg: &Path) -> Vec<String> {
    let mut args = vec![
        "--newline".to_string(),
        "--progress".to_string(),
        "--ffmpeg-location".to_string(),
        path_arg(ffmpeg),
    ];

    if let Some(out_dir) = &request.out_dir {
        args.push("-P".to_string());
        args.push(path_arg(out_dir));
    }

    match request.cookie_source() {
        Some(CookieSource::Browser(browser)) => {
            args.push("--cookies-from-browser".to_string());
            args.push(browser);
        }
        Some(CookieSource::File(path)) => {
            args.push("--cookies".to_string());
            args.push(path_arg(&path));
        }
        None => {}
    }

    let format = request.effective_format().to_string();
    match request.kind {
        MediaKind::Video => args.extend([
            "-f".to_string(),
            "bv*+ba/best".to_string(),
            "--merge-output-format".to_string(),
            format,
        ]),
        MediaKind::Audio => args.extend([
            "-f".to_string(),
            "ba/best".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            format,
        ]),
    }

    args.push("-o".to_string());
    args.push(OUTPUT_TEMPLATE.to_string());
    args.push(request.url.trim().to_string());
    args
}

/// Build the ffmpeg argument vector: `-y -i <input> <profile> <extra> <output>`.
pub fn convert_args(request: &ConvertRequest) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(&request.input_path),
    ];
    args.extend(request.profile.args().iter().map(|arg| (*arg).to_string()));
    args.extend(request.extra_args.iter().cloned());
    args.push(path_arg(&request.output_path));
    args
}

//! Main commands enum.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download yt-dlp and ffmpeg into the managed directory if missing
    Provision {
        /// Print the provisioning report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download media from a URL
    Download {
        /// Address of the page or media to download
        url: String,
        /// Media kind: "video" or "audio"
        #[arg(short, long, default_value = "video")]
        kind: String,
        /// Container or audio format (default: mp4 for video, mp3 for audio)
        #[arg(short, long)]
        format: Option<String>,
        /// Directory to save into (default: current directory)
        #[arg(short, long = "out-dir")]
        out_dir: Option<PathBuf>,
        /// Read cookies from an installed browser profile
        #[arg(long = "cookies-from-browser", conflicts_with = "cookies")]
        cookies_from_browser: Option<String>,
        /// Read cookies from a Netscape-format cookie file
        #[arg(long)]
        cookies: Option<PathBuf>,
    },

    /// Convert a media file with ffmpeg
    Convert {
        /// Input media file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Conversion profile: remux, h264-aac, mp3, wav, frame, custom
        /// (default: chosen from the output extension)
        #[arg(short, long)]
        profile: Option<String>,
        /// Extra ffmpeg arguments, placed after the profile arguments
        #[arg(last = true)]
        extra_args: Vec<String>,
    },

    /// Show resolved data and binary paths
    Paths,
}

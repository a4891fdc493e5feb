//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the media download and conversion engine.
///
/// Global options override the `DLPRO_*` environment configuration for
/// this invocation only.
#[derive(Parser)]
#[command(name = "dlpro")]
#[command(about = "Download and convert media with managed yt-dlp and ffmpeg binaries")]
#[command(version)]
pub struct Cli {
    /// Override the managed binaries directory
    #[arg(long = "bin-dir", env = "DLPRO_BIN_DIR", global = true)]
    pub bin_dir: Option<PathBuf>,

    /// Skip the converter self-check before the first conversion
    #[arg(long = "no-self-check", global = true)]
    pub no_self_check: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

// ============================================================================
// hitclip-cli/src/cli.rs
// ============================================================================
//
// COMMAND LINE: Argument definitions for the hitclip binary
//
// Every run parameter is optional on the command line. Values that are not
// given are filled in from the persisted settings record, so a bare
// `hitclip clip` repeats the previous run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "hitclip: cut highlight clips out of gameplay recordings",
    long_about = "Scans recordings for the on-screen elimination marker and extracts a short clip around every hit using ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output to the console as well as the log file
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detects hits in every .mp4 of the input directory and writes clips
    Clip(ClipArgs),
}

#[derive(Parser, Debug, Default)]
pub struct ClipArgs {
    /// Directory containing the .mp4 recordings
    #[arg(short = 'i', long = "input", value_name = "INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory where clips will be written
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Seconds of footage kept before each hit
    #[arg(long, value_name = "SECONDS", allow_hyphen_values = true)]
    pub pre: Option<String>,

    /// Seconds of footage kept after each hit
    #[arg(long, value_name = "SECONDS", allow_hyphen_values = true)]
    pub post: Option<String>,

    /// Inspect every Nth frame
    #[arg(short = 's', long = "sample-rate", value_name = "FRAMES")]
    pub sample_rate: Option<String>,

    /// Delete each recording once all of its clips were written
    #[arg(long, conflicts_with = "keep_original")]
    pub delete_original: bool,

    /// Keep recordings even if the saved settings say to delete them
    #[arg(long)]
    pub keep_original: bool,

    /// Also concatenate the clips of each recording into <name>-final.mp4
    #[arg(long)]
    pub merge: bool,

    /// Reference marker picture (100x100 PNG)
    #[arg(long, value_name = "PNG", env = "HITCLIP_REFERENCE_IMAGE")]
    pub reference: Option<PathBuf>,

    /// Directory for log files (defaults to OUTPUT_DIR/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Seconds an extraction may run before it is killed
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

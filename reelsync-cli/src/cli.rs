use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "reelsync",
    version,
    about = "Local short-form video pipeline: ingest, edit and publish-queue primitives"
)]
pub struct Args {
    /// Project root containing data/, videos/ and logs/
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    pub base_dir: PathBuf,

    /// Configuration file (defaults to <base-dir>/reelsync.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the directory layout and an empty inventory
    Init,

    /// Download at most one new video from a source URL
    Ingest {
        /// Source URL (channel, playlist or single video)
        url: String,
    },

    /// Transform all pending raw videos into processed assets
    Edit,

    /// Print the next publishable video path, or an empty line when none
    GetNext,

    /// Mark a video as posted (exit code 2 when the id is unknown)
    MarkPosted {
        /// Inventory key of the video
        video_id: String,
    },

    /// Mark a video as failed (exit code 2 when the id is unknown)
    MarkFailed {
        /// Inventory key of the video
        video_id: String,
    },
}

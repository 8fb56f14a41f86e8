//! The narrow contract between the ingestor and whatever actually talks to
//! the network. Production uses the yt-dlp driver in [`crate::ytdlp`]; tests
//! plug in fakes.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("extractor binary not available: {0}")]
    BinaryUnavailable(String),

    #[error("extractor exited with {status}: {stderr}")]
    CommandFailed { status: ExitStatus, stderr: String },

    #[error("invalid extractor output: {0}")]
    InvalidOutput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("downloaded file not found for {video_id}")]
    DownloadMissing { video_id: String },
}

/// A video discovered in a source listing, not yet downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateVideo {
    pub video_id: String,
    pub url: String,
    pub title: String,
    /// Seconds, 0 if the listing did not report one.
    pub duration: i64,
}

/// A video that landed on disk.
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    pub video_id: String,
    pub source_url: String,
    pub title: String,
    pub duration: i64,
    pub file_path: PathBuf,
}

/// External collaborator that lists and downloads videos for a source URL.
pub trait VideoExtractor {
    /// Enumerate candidate videos behind `source_url`, in listing order.
    fn list(&self, source_url: &str) -> Result<Vec<CandidateVideo>, ExtractorError>;

    /// Download one candidate into `dest_dir`.
    fn download(
        &self,
        candidate: &CandidateVideo,
        dest_dir: &Path,
    ) -> Result<DownloadedVideo, ExtractorError>;
}

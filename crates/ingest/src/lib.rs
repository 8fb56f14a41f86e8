//! # reel-ingest
//!
//! The ingestion collaborator: lists a source URL through an external
//! extractor, downloads at most one new video per run into `videos/raw/`,
//! and appends a `pending` row to the inventory. Download failures after
//! retries leave a `failed` marker when the id already has a row.

mod error;
mod extractor;
mod ingestor;
mod retry;
mod wait;
mod ytdlp;

pub use error::{IngestError, Result};
pub use extractor::{CandidateVideo, DownloadedVideo, ExtractorError, VideoExtractor};
pub use ingestor::{IngestOutcome, Ingestor};
pub use retry::RetryPolicy;
pub use wait::{SKIP_WAITS_ENV, WaitPolicy};
pub use ytdlp::{DEFAULT_USER_AGENT, YtDlpExtractor};

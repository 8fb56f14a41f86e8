//! yt-dlp subprocess driver implementing [`VideoExtractor`].
//!
//! Listing uses `-J --flat-playlist`; downloads use the `%(id)s.%(ext)s`
//! output template and the produced file is located afterwards by id prefix,
//! since the container extension is chosen by yt-dlp.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::extractor::{CandidateVideo, DownloadedVideo, ExtractorError, VideoExtractor};

static DEFAULT_YTDLP_PATH: &str = "yt-dlp";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static YTDLP_AVAILABLE: LazyLock<bool> = LazyLock::new(|| {
    Command::new(DEFAULT_YTDLP_PATH)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
});

/// yt-dlp `-J` output: either a playlist with `entries` or a single video
/// object carrying the same fields at the top level.
#[derive(Debug, Default, Clone, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    entries: Option<Vec<RawEntry>>,
    #[serde(flatten)]
    single: RawEntry,
}

impl RawEntry {
    fn into_candidate(self) -> Option<CandidateVideo> {
        let video_id = self.id?;
        let url = self.url.or(self.webpage_url)?;
        Some(CandidateVideo {
            video_id,
            url,
            title: self.title.unwrap_or_default(),
            duration: self.duration.unwrap_or(0.0) as i64,
        })
    }
}

#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary_path: String,
    user_agent: String,
}

impl YtDlpExtractor {
    pub fn new() -> Self {
        let binary_path =
            std::env::var("YTDLP_PATH").unwrap_or_else(|_| DEFAULT_YTDLP_PATH.to_string());
        Self {
            binary_path,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_binary_path(path: impl Into<String>) -> Self {
        Self {
            binary_path: path.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Whether the default `yt-dlp` binary answers `--version`.
    pub fn is_available() -> bool {
        *YTDLP_AVAILABLE
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(["--no-warnings", "--user-agent", &self.user_agent]);
        cmd
    }

    fn run(&self, cmd: &mut Command) -> Result<Vec<u8>, ExtractorError> {
        let output = cmd.output().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ExtractorError::BinaryUnavailable(self.binary_path.clone())
            } else {
                ExtractorError::Io(err)
            }
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractorError::CommandFailed {
                status: output.status,
                stderr,
            });
        }
        Ok(output.stdout)
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoExtractor for YtDlpExtractor {
    fn list(&self, source_url: &str) -> Result<Vec<CandidateVideo>, ExtractorError> {
        debug!(url = %source_url, "fetching listing");
        let stdout = self.run(
            self.command()
                .args(["-J", "--flat-playlist"])
                .arg(source_url),
        )?;

        let listing: RawListing = serde_json::from_slice(&stdout)?;
        let entries = match listing.entries {
            Some(entries) => entries,
            None if listing.single.id.is_some() => vec![listing.single],
            None => Vec::new(),
        };

        let candidates: Vec<CandidateVideo> = entries
            .into_iter()
            .filter_map(RawEntry::into_candidate)
            .collect();
        debug!(count = candidates.len(), "parsed listing entries");
        Ok(candidates)
    }

    fn download(
        &self,
        candidate: &CandidateVideo,
        dest_dir: &Path,
    ) -> Result<DownloadedVideo, ExtractorError> {
        std::fs::create_dir_all(dest_dir)?;
        let template = dest_dir.join("%(id)s.%(ext)s");

        let mut cmd = self.command();
        cmd.args(["-f", "bestvideo+bestaudio/best", "--no-playlist", "-o"])
            .arg(template.as_os_str())
            .arg(&candidate.url);
        self.run(&mut cmd)?;

        let file_path = find_downloaded_file(dest_dir, &candidate.video_id)?.ok_or_else(|| {
            warn!(video_id = %candidate.video_id, "download produced no file");
            ExtractorError::DownloadMissing {
                video_id: candidate.video_id.clone(),
            }
        })?;

        Ok(DownloadedVideo {
            video_id: candidate.video_id.clone(),
            source_url: candidate.url.clone(),
            title: candidate.title.clone(),
            duration: candidate.duration,
            file_path,
        })
    }
}

/// Locate `<video_id>.<ext>` in `dir`, skipping partial downloads.
fn find_downloaded_file(dir: &Path, video_id: &str) -> Result<Option<PathBuf>, ExtractorError> {
    let prefix = format!("{video_id}.");
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) && !name.ends_with(".part") && !name.ends_with(".ytdl") {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_listing_parses_into_candidates() {
        let raw = r#"{
            "id": "playlist",
            "entries": [
                {"id": "v1", "url": "https://example.com/v1", "title": "One", "duration": 12.7},
                {"id": null, "url": "https://example.com/skipped"},
                {"id": "v2", "webpage_url": "https://example.com/v2"}
            ]
        }"#;
        let listing: RawListing = serde_json::from_str(raw).expect("parse");
        let candidates: Vec<_> = listing
            .entries
            .expect("entries")
            .into_iter()
            .filter_map(RawEntry::into_candidate)
            .collect();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].video_id, "v1");
        assert_eq!(candidates[0].duration, 12);
        assert_eq!(candidates[1].url, "https://example.com/v2");
        assert_eq!(candidates[1].duration, 0);
    }

    #[test]
    fn single_video_listing_becomes_one_candidate() {
        let raw = r#"{"id": "solo", "webpage_url": "https://example.com/solo", "title": "Solo"}"#;
        let listing: RawListing = serde_json::from_str(raw).expect("parse");
        assert!(listing.entries.is_none());
        let candidate = listing.single.into_candidate().expect("candidate");
        assert_eq!(candidate.video_id, "solo");
    }

    #[test]
    fn downloaded_file_lookup_skips_partials() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("v1.mp4.part"), b"").expect("write");
        std::fs::write(dir.path().join("other.mp4"), b"").expect("write");
        assert!(
            find_downloaded_file(dir.path(), "v1")
                .expect("lookup")
                .is_none()
        );

        std::fs::write(dir.path().join("v1.webm"), b"").expect("write");
        let found = find_downloaded_file(dir.path(), "v1")
            .expect("lookup")
            .expect("file");
        assert_eq!(found.file_name().and_then(|n| n.to_str()), Some("v1.webm"));
    }
}

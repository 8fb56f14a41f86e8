//! Row types for the video inventory table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names of the inventory table, in persisted order.
pub const COLUMN_NAMES: [&str; 8] = [
    "video_id",
    "source_url",
    "title",
    "duration",
    "path_local",
    "status_fb",
    "created_at",
    "updated_at",
];

/// Lifecycle state of a video.
///
/// Persisted as the lowercase strings `pending`, `ready`, `posted`, `failed`.
/// Any other string in the backing file fails deserialization, so an invalid
/// status can never round-trip through the store.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VideoStatus {
    /// Downloaded (raw) or transformed (processed) but not yet picked up.
    Pending,
    /// Transformed and waiting for an external upload workflow.
    Ready,
    /// Successfully posted. Terminal.
    Posted,
    /// Download, transform or publish failed. Terminal, kept for inspection.
    Failed,
}

impl VideoStatus {
    /// Terminal states are never transitioned out of by any collaborator.
    pub fn is_terminal(self) -> bool {
        matches!(self, VideoStatus::Posted | VideoStatus::Failed)
    }
}

/// Current UTC time truncated to microsecond precision.
///
/// The table stores timestamps with microsecond resolution, so truncating at
/// creation time keeps in-memory and persisted values comparable.
pub fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

/// One row of the inventory table. Field order matches [`COLUMN_NAMES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Stable external identifier, unique across the table.
    pub video_id: String,
    /// Origin URL used for ingestion.
    pub source_url: String,
    /// Human-readable title, may be empty.
    pub title: String,
    /// Duration in seconds, 0 if unknown.
    pub duration: i64,
    /// Project-root-relative path to the current asset location.
    pub path_local: String,
    pub status_fb: VideoStatus,
    /// Set once at row creation, never mutated afterwards.
    #[serde(with = "ts_micros")]
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful mutation.
    #[serde(with = "ts_micros")]
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Build a freshly ingested `pending` row with both timestamps set to now.
    pub fn new(
        video_id: impl Into<String>,
        source_url: impl Into<String>,
        title: impl Into<String>,
        duration: i64,
        path_local: impl Into<String>,
    ) -> Self {
        let now = now_utc();
        Self {
            video_id: video_id.into(),
            source_url: source_url.into(),
            title: title.into(),
            duration,
            path_local: path_local.into(),
            status_fb: VideoStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Typed partial update for a single row.
///
/// `video_id`, `source_url` and `created_at` are deliberately absent, so an
/// update can never touch a row's identity or creation time. The store sets
/// `updated_at` itself on every applied update.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub title: Option<String>,
    pub duration: Option<i64>,
    pub path_local: Option<String>,
    pub status_fb: Option<VideoStatus>,
}

impl RecordUpdate {
    /// Update that only transitions the lifecycle state.
    pub fn status(status: VideoStatus) -> Self {
        Self {
            status_fb: Some(status),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path_local: impl Into<String>) -> Self {
        self.path_local = Some(path_local.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub(crate) fn apply(&self, record: &mut VideoRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(duration) = self.duration {
            record.duration = duration;
        }
        if let Some(path_local) = &self.path_local {
            record.path_local = path_local.clone();
        }
        if let Some(status) = self.status_fb {
            record.status_fb = status;
        }
    }
}

/// Timestamp codec: microsecond precision with an explicit UTC offset.
///
/// Values read back are normalized to UTC whatever offset they carry.
mod ts_micros {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f+00:00";

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

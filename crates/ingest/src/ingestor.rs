//! Single-shot ingestion: download at most one new video per run.

use reel_inventory::{Inventory, RecordUpdate, VideoRecord, VideoStatus};
use tracing::{error, info, warn};

use crate::error::{IngestError, Result};
use crate::extractor::{CandidateVideo, VideoExtractor};
use crate::retry::RetryPolicy;
use crate::wait::WaitPolicy;

/// What an ingestion run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Downloaded { video_id: String },
    /// Every listed candidate is already in the inventory (or the listing
    /// was empty). Not an error.
    NothingNew,
}

pub struct Ingestor<'a, E> {
    inventory: &'a Inventory,
    extractor: E,
    retry: RetryPolicy,
    waits: WaitPolicy,
}

impl<'a, E: VideoExtractor> Ingestor<'a, E> {
    pub fn new(inventory: &'a Inventory, extractor: E) -> Self {
        let waits = WaitPolicy::from_env(
            std::time::Duration::from_secs(1),
            std::time::Duration::from_secs(6),
        );
        Self::with_policies(inventory, extractor, RetryPolicy::default(), waits)
    }

    pub fn with_policies(
        inventory: &'a Inventory,
        extractor: E,
        retry: RetryPolicy,
        waits: WaitPolicy,
    ) -> Self {
        Self {
            inventory,
            extractor,
            retry,
            waits,
        }
    }

    /// List `source_url`, pick the first candidate not yet in the inventory,
    /// download it and append a `pending` row pointing at the raw asset.
    pub fn ingest(&self, source_url: &str) -> Result<IngestOutcome> {
        if source_url.is_empty() {
            warn!("no source url provided");
            return Ok(IngestOutcome::NothingNew);
        }

        let layout = self.inventory.layout();
        layout
            .ensure_dirs()
            .map_err(reel_inventory::InventoryError::from)?;

        self.waits.random_wait();
        let candidates = self
            .extractor
            .list(source_url)
            .map_err(|source| IngestError::Listing {
                url: source_url.to_string(),
                source,
            })?;

        let Some(candidate) = self.first_new_candidate(candidates)? else {
            info!("no new videos found");
            return Ok(IngestOutcome::NothingNew);
        };

        let raw_dir = layout.raw_dir();
        self.waits.random_wait();
        let downloaded = match self
            .retry
            .run(&self.waits, |_| self.extractor.download(&candidate, &raw_dir))
        {
            Ok(downloaded) => downloaded,
            Err(source) => {
                error!(video_id = %candidate.video_id, url = %candidate.url, error = %source,
                    "download failed after retries");
                // Best effort: the id usually has no row yet, but a retried
                // ingestion of a known video should leave a failed marker.
                if let Err(err) = self
                    .inventory
                    .update_by_key(&candidate.video_id, &RecordUpdate::status(VideoStatus::Failed))
                {
                    warn!(video_id = %candidate.video_id, error = %err,
                        "could not record download failure");
                }
                return Err(IngestError::Download {
                    url: candidate.url.clone(),
                    attempts: self.retry.retries,
                    source,
                });
            }
        };

        let path_local = layout
            .relativize(&downloaded.file_path)
            .unwrap_or_else(|| downloaded.file_path.to_string_lossy().into_owned());
        let record = VideoRecord::new(
            &downloaded.video_id,
            &downloaded.source_url,
            &downloaded.title,
            downloaded.duration,
            path_local,
        );
        self.inventory.append(std::slice::from_ref(&record))?;

        info!(video_id = %downloaded.video_id, "downloaded video");
        Ok(IngestOutcome::Downloaded {
            video_id: downloaded.video_id,
        })
    }

    fn first_new_candidate(
        &self,
        candidates: Vec<CandidateVideo>,
    ) -> Result<Option<CandidateVideo>> {
        for candidate in candidates {
            if !self.inventory.exists_by_key(&candidate.video_id)? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

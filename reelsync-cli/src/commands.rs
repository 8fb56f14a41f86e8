//! Command bodies, kept separate from argument parsing so they are testable.

use reel_edit::{Editor, FfmpegTransformer, RelocateTransformer};
use reel_ingest::{IngestOutcome, Ingestor, YtDlpExtractor};
use reel_inventory::{
    Inventory, PROCESSED_SEGMENT, RecordUpdate, VideoStatus,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;

/// Create the directory layout and an empty inventory.
pub fn init(inventory: &Inventory) -> Result<()> {
    inventory.layout().ensure_dirs()?;
    inventory.ensure()?;
    info!(base_dir = %inventory.layout().base_dir().display(), "initialized project layout");
    Ok(())
}

/// Run the ingestion collaborator once for `url`.
pub fn ingest(inventory: &Inventory, config: &AppConfig, url: &str) -> Result<IngestOutcome> {
    let mut extractor = match &config.ingest.ytdlp_path {
        Some(path) => YtDlpExtractor::with_binary_path(path),
        None => YtDlpExtractor::new(),
    };
    if let Some(user_agent) = &config.ingest.user_agent {
        extractor = extractor.user_agent(user_agent);
    }

    let ingestor = Ingestor::with_policies(
        inventory,
        extractor,
        config.retry_policy(),
        config.wait_policy(),
    );
    Ok(ingestor.ingest(url)?)
}

/// Transform all pending raw videos. Falls back to plain relocation when
/// ffmpeg is unavailable or effects are disabled.
pub fn edit(inventory: &Inventory, config: &AppConfig) -> Result<usize> {
    let use_ffmpeg = !config.edit.relocate_only
        && (config.edit.ffmpeg_path.is_some() || FfmpegTransformer::is_available());

    let processed = if use_ffmpeg {
        let transformer = match &config.edit.ffmpeg_path {
            Some(path) => FfmpegTransformer::with_binary_path(path),
            None => FfmpegTransformer::new(),
        };
        Editor::new(inventory, transformer).process_pending()?
    } else {
        if !config.edit.relocate_only {
            info!("ffmpeg not found, relocating without effects");
        }
        Editor::new(inventory, RelocateTransformer).process_pending()?
    };
    Ok(processed)
}

/// Next publishable video path, reconciling rows whose file is missing.
pub fn get_next(inventory: &Inventory) -> Result<Option<String>> {
    let found = inventory.scan_and_reconcile(
        &[VideoStatus::Pending, VideoStatus::Ready],
        PROCESSED_SEGMENT,
    )?;
    Ok(found.map(|row| row.path_local))
}

/// Returns whether the row existed.
pub fn mark_posted(inventory: &Inventory, video_id: &str) -> Result<bool> {
    let updated = inventory.update_by_key(video_id, &RecordUpdate::status(VideoStatus::Posted))?;
    if updated {
        info!(video_id, "marked as posted");
    } else {
        warn!(video_id, "could not find video to mark as posted");
    }
    Ok(updated)
}

/// Returns whether the row existed.
pub fn mark_failed(inventory: &Inventory, video_id: &str) -> Result<bool> {
    let updated = inventory.update_by_key(video_id, &RecordUpdate::status(VideoStatus::Failed))?;
    if updated {
        info!(video_id, "marked as failed");
    } else {
        warn!(video_id, "could not find video to mark as failed");
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_inventory::{Layout, VideoRecord};
    use std::path::Path;

    fn inventory(base: &Path) -> Inventory {
        let inventory = Inventory::new(Layout::new(base));
        inventory.layout().ensure_dirs().expect("dirs");
        inventory
    }

    fn seeded_row(
        inventory: &Inventory,
        video_id: &str,
        status: VideoStatus,
        path_local: &str,
        with_file: bool,
    ) {
        if with_file {
            let path = inventory.layout().resolve(path_local);
            std::fs::write(path, b"bytes").expect("write");
        }
        let mut row = VideoRecord::new(
            video_id,
            format!("https://example.com/{video_id}"),
            video_id.to_uppercase(),
            10,
            path_local,
        );
        row.status_fb = status;
        inventory.append(&[row]).expect("append");
    }

    #[test]
    fn get_next_returns_first_existing_processed_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = inventory(dir.path());
        seeded_row(
            &inventory,
            "p1",
            VideoStatus::Pending,
            "videos/processed/p1.mp4",
            true,
        );

        let next = get_next(&inventory).expect("get next");
        assert_eq!(next.as_deref(), Some("videos/processed/p1.mp4"));
    }

    #[test]
    fn get_next_fails_missing_rows_and_skips_to_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = inventory(dir.path());
        seeded_row(
            &inventory,
            "m1",
            VideoStatus::Ready,
            "videos/processed/missing.mp4",
            false,
        );
        seeded_row(
            &inventory,
            "e1",
            VideoStatus::Ready,
            "videos/processed/exists.mp4",
            true,
        );

        let next = get_next(&inventory).expect("get next");
        assert_eq!(next.as_deref(), Some("videos/processed/exists.mp4"));

        let rows = inventory.read_all().expect("read");
        assert_eq!(rows[0].status_fb, VideoStatus::Failed);
        assert_eq!(rows[1].status_fb, VideoStatus::Ready);
    }

    #[test]
    fn get_next_ignores_raw_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = inventory(dir.path());
        seeded_row(
            &inventory,
            "r1",
            VideoStatus::Pending,
            "videos/raw/r1.mp4",
            true,
        );

        assert!(get_next(&inventory).expect("get next").is_none());
        // Raw rows are the editor's business; reconciliation must not touch them.
        assert_eq!(
            inventory.read_all().expect("read")[0].status_fb,
            VideoStatus::Pending
        );
    }

    #[test]
    fn mark_posted_advances_status_and_excludes_from_get_next() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = inventory(dir.path());
        seeded_row(
            &inventory,
            "post1",
            VideoStatus::Ready,
            "videos/processed/post1.mp4",
            true,
        );
        let before = inventory.read_all().expect("read")[0].updated_at;

        assert!(mark_posted(&inventory, "post1").expect("mark"));

        let row = &inventory.read_all().expect("read")[0];
        assert_eq!(row.status_fb, VideoStatus::Posted);
        assert!(row.updated_at >= before);
        assert!(get_next(&inventory).expect("get next").is_none());
    }

    #[test]
    fn mark_unknown_id_reports_not_found_and_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = inventory(dir.path());
        seeded_row(
            &inventory,
            "exists1",
            VideoStatus::Ready,
            "videos/processed/exists1.mp4",
            true,
        );

        assert!(!mark_failed(&inventory, "nonexistent-id").expect("mark"));
        let row = &inventory.read_all().expect("read")[0];
        assert_eq!(row.video_id, "exists1");
        assert_eq!(row.status_fb, VideoStatus::Ready);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = Inventory::new(Layout::new(dir.path()));
        init(&inventory).expect("first init");
        init(&inventory).expect("second init");
        assert!(inventory.read_all().expect("read").is_empty());
    }
}

//! Scan-and-transform loop over pending raw videos.

use reel_inventory::{Inventory, RAW_SEGMENT, RecordUpdate, VideoStatus};
use tracing::{error, info, warn};

use crate::error::{EditError, Result};
use crate::transform::Transformer;

pub struct Editor<'a, T> {
    inventory: &'a Inventory,
    transformer: T,
}

impl<'a, T: Transformer> Editor<'a, T> {
    pub fn new(inventory: &'a Inventory, transformer: T) -> Self {
        Self {
            inventory,
            transformer,
        }
    }

    /// Transform every `pending` row whose path points at a raw asset.
    ///
    /// Rows whose raw file is missing are skipped with a warning and stay
    /// `pending` for the next run. A failed transform marks its row `failed`
    /// and the loop continues. Returns the number of videos transformed.
    pub fn process_pending(&self) -> Result<usize> {
        let layout = self.inventory.layout();
        layout
            .ensure_dirs()
            .map_err(reel_inventory::InventoryError::from)?;

        let mut processed = 0usize;
        for row in self.inventory.read_all()? {
            if row.status_fb != VideoStatus::Pending || !row.path_local.contains(RAW_SEGMENT) {
                continue;
            }

            let src = layout.resolve(&row.path_local);
            if !src.exists() {
                warn!(video_id = %row.video_id, path = %src.display(), "raw file not found");
                continue;
            }
            let Some(file_name) = src.file_name() else {
                warn!(video_id = %row.video_id, path = %src.display(), "raw path has no file name");
                continue;
            };
            let dst = layout.processed_dir().join(file_name);

            match self.transformer.transform(&src, &dst) {
                Ok(()) => {
                    let path_local = layout
                        .relativize(&dst)
                        .unwrap_or_else(|| dst.to_string_lossy().into_owned());
                    let update = RecordUpdate::status(VideoStatus::Ready).with_path(path_local);
                    if self.inventory.update_by_key(&row.video_id, &update)? {
                        processed += 1;
                        info!(video_id = %row.video_id, transformer = self.transformer.name(),
                            "video ready for publishing");
                    }
                }
                Err(err) => {
                    error!(video_id = %row.video_id, error = %err, "transform failed");
                    self.inventory
                        .update_by_key(&row.video_id, &RecordUpdate::status(VideoStatus::Failed))?;
                }
            }
        }
        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{RelocateTransformer, TransformError};
    use reel_inventory::{Layout, VideoRecord};
    use std::path::Path;

    struct FailingTransformer;

    impl Transformer for FailingTransformer {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn transform(&self, _src: &Path, _dst: &Path) -> std::result::Result<(), TransformError> {
            Err(TransformError::BinaryUnavailable("ffmpeg".to_string()))
        }
    }

    fn seeded_inventory(base: &Path, with_file: bool) -> Inventory {
        let inventory = Inventory::new(Layout::new(base));
        inventory.layout().ensure_dirs().expect("dirs");
        if with_file {
            let raw = inventory.layout().raw_dir().join("v1.mp4");
            std::fs::write(&raw, b"raw bytes").expect("write");
        }
        let row = VideoRecord::new("v1", "https://example.com/v1", "V1", 30, "videos/raw/v1.mp4");
        inventory.append(&[row]).expect("append");
        inventory
    }

    #[test]
    fn pending_raw_row_becomes_ready_with_processed_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = seeded_inventory(dir.path(), true);

        let processed = Editor::new(&inventory, RelocateTransformer)
            .process_pending()
            .expect("process");
        assert_eq!(processed, 1);

        let rows = inventory.read_all().expect("read");
        assert_eq!(rows[0].status_fb, VideoStatus::Ready);
        assert_eq!(rows[0].path_local, "videos/processed/v1.mp4");
        assert!(inventory.layout().resolve(&rows[0].path_local).exists());
        assert!(!inventory.layout().raw_dir().join("v1.mp4").exists());
    }

    #[test]
    fn missing_raw_file_is_skipped_and_row_stays_pending() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = seeded_inventory(dir.path(), false);

        let processed = Editor::new(&inventory, RelocateTransformer)
            .process_pending()
            .expect("process");
        assert_eq!(processed, 0);
        assert_eq!(
            inventory.read_all().expect("read")[0].status_fb,
            VideoStatus::Pending
        );
    }

    #[test]
    fn failed_transform_marks_the_row_failed_and_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = seeded_inventory(dir.path(), true);
        let second = VideoRecord::new("v2", "https://example.com/v2", "V2", 30, "videos/raw/v2.mp4");
        std::fs::write(inventory.layout().raw_dir().join("v2.mp4"), b"raw").expect("write");
        inventory.append(&[second]).expect("append");

        let processed = Editor::new(&inventory, FailingTransformer)
            .process_pending()
            .expect("process");
        assert_eq!(processed, 0);

        let rows = inventory.read_all().expect("read");
        assert_eq!(rows[0].status_fb, VideoStatus::Failed);
        assert_eq!(rows[1].status_fb, VideoStatus::Failed);
    }

    #[test]
    fn non_raw_rows_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inventory = Inventory::new(Layout::new(dir.path()));
        inventory.layout().ensure_dirs().expect("dirs");
        let row = VideoRecord::new(
            "done",
            "https://example.com/done",
            "Done",
            30,
            "videos/processed/done.mp4",
        );
        inventory.append(&[row]).expect("append");

        let processed = Editor::new(&inventory, RelocateTransformer)
            .process_pending()
            .expect("process");
        assert_eq!(processed, 0);
        assert_eq!(
            inventory.read_all().expect("read")[0].status_fb,
            VideoStatus::Pending
        );
    }
}

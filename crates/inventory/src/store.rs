//! The inventory store: a flat, schema-fixed table of [`VideoRecord`] rows
//! persisted as JSON lines, safe under concurrent single-host access from
//! multiple independent processes.
//!
//! Every mutation runs as read-full-table, compute-new-table-in-memory,
//! atomic whole-file replace, under a single exclusive lock tied to the
//! table's location. Readers that skip the lock may observe a stale snapshot
//! but never a partially written file. The whole-table rewrite bounds table
//! size to what fits in memory, which is fine for a small single-tenant
//! queue and is not meant to scale past that.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::error::{InventoryError, Result};
use crate::layout::Layout;
use crate::lock::StoreLock;
use crate::record::{RecordUpdate, VideoRecord, VideoStatus, now_utc};

/// Tunables for the locking discipline.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a writer waits for the exclusive lock before giving up.
    pub lock_timeout: Duration,
    /// Poll interval while the lock is contended.
    pub lock_poll_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(30),
            lock_poll_interval: Duration::from_millis(50),
        }
    }
}

/// Handle to the inventory table at a fixed location.
///
/// Holds no state besides paths and tunables; every operation re-reads from
/// persisted state, so independent handles (and independent processes) stay
/// coherent through the lock.
#[derive(Debug, Clone)]
pub struct Inventory {
    layout: Layout,
    config: StoreConfig,
}

impl Inventory {
    pub fn new(layout: Layout) -> Self {
        Self::with_config(layout, StoreConfig::default())
    }

    pub fn with_config(layout: Layout, config: StoreConfig) -> Self {
        Self { layout, config }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn lock(&self) -> Result<StoreLock> {
        StoreLock::acquire(
            &self.layout.lock_path(),
            self.config.lock_timeout,
            self.config.lock_poll_interval,
        )
    }

    /// Create an empty table if the backing file does not exist. Idempotent.
    ///
    /// The check-and-create runs under the lock so two processes cannot both
    /// create the file; the fast path skips the lock once the file exists.
    pub fn ensure(&self) -> Result<()> {
        let path = self.layout.inventory_path();
        if path.exists() {
            return Ok(());
        }
        let _lock = self.lock()?;
        if path.exists() {
            // Another process won the create race while we waited.
            return Ok(());
        }
        self.layout.ensure_dirs()?;
        self.write_rows(&[])?;
        info!(path = %path.display(), "created new inventory");
        Ok(())
    }

    /// Read every row. Lazily creates an empty table when the file is absent.
    pub fn read_all(&self) -> Result<Vec<VideoRecord>> {
        self.ensure()?;
        self.read_rows()
    }

    /// Append rows, deduplicating by `video_id` and keeping the first-seen
    /// record per key. Appending an already-present key is a no-op for that
    /// key; duplicates within `rows` collapse the same way.
    pub fn append(&self, rows: &[VideoRecord]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.ensure()?;
        let _lock = self.lock()?;
        let mut table = self.read_rows()?;
        let mut seen: HashSet<String> = table.iter().map(|row| row.video_id.clone()).collect();

        let mut appended = 0usize;
        for row in rows {
            if seen.insert(row.video_id.clone()) {
                table.push(row.clone());
                appended += 1;
            }
        }
        let skipped = rows.len() - appended;
        if appended == 0 {
            debug!(skipped, "append found only duplicate keys");
            return Ok(());
        }

        self.write_rows(&table)?;
        info!(appended, skipped, "appended rows to inventory");
        Ok(())
    }

    /// Apply a partial update to the row with the given key.
    ///
    /// Returns `false` (not an error) when no such row exists. On success the
    /// row's `updated_at` is refreshed regardless of which fields were set.
    pub fn update_by_key(&self, video_id: &str, update: &RecordUpdate) -> Result<bool> {
        self.ensure()?;
        let _lock = self.lock()?;
        let mut table = self.read_rows()?;
        let Some(index) = table.iter().position(|row| row.video_id == video_id) else {
            debug!(video_id, "no inventory row to update");
            return Ok(false);
        };

        let row = &mut table[index];
        update.apply(row);
        row.updated_at = now_utc();

        self.write_rows(&table)?;
        info!(video_id, update = ?update, "updated inventory row");
        Ok(true)
    }

    /// First row satisfying `predicate`, in table order.
    ///
    /// Streams the file without taking the lock and stops at the first hit,
    /// so a concurrent writer may race it; the result is always a complete
    /// snapshot of some committed row.
    pub fn find_first<P>(&self, mut predicate: P) -> Result<Option<VideoRecord>>
    where
        P: FnMut(&VideoRecord) -> bool,
    {
        self.ensure()?;
        let path = self.layout.inventory_path();
        let reader = BufReader::new(File::open(&path)?);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: VideoRecord =
                serde_json::from_str(&line).map_err(|source| InventoryError::Corrupt {
                    path: path.clone(),
                    line: index + 1,
                    source,
                })?;
            if predicate(&record) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Lock-free existence check by key.
    pub fn exists_by_key(&self, video_id: &str) -> Result<bool> {
        Ok(self
            .find_first(|row| row.video_id == video_id)?
            .is_some())
    }

    /// First row with the given status whose `path_local` contains
    /// `path_substring`, in table order.
    pub fn next_eligible(
        &self,
        status: VideoStatus,
        path_substring: &str,
    ) -> Result<Option<VideoRecord>> {
        self.find_first(|row| row.status_fb == status && row.path_local.contains(path_substring))
    }

    /// Publisher variant of [`Inventory::next_eligible`]: one lock-held pass
    /// that returns the first matching row whose referenced file exists on
    /// disk, transitioning every earlier matching row with a missing file to
    /// `failed` in the same write.
    ///
    /// Eligibility order is physical row order; no other tie-break applies.
    pub fn scan_and_reconcile(
        &self,
        statuses: &[VideoStatus],
        path_substring: &str,
    ) -> Result<Option<VideoRecord>> {
        let _lock = self.lock()?;
        if !self.layout.inventory_path().exists() {
            return Ok(None);
        }
        let mut table = self.read_rows()?;

        let mut missing = Vec::new();
        let mut found = None;
        for (index, row) in table.iter().enumerate() {
            if !statuses.contains(&row.status_fb) || !row.path_local.contains(path_substring) {
                continue;
            }
            let candidate = self.layout.resolve(&row.path_local);
            if candidate.exists() {
                found = Some(row.clone());
                break;
            }
            error!(video_id = %row.video_id, path = %candidate.display(),
                "referenced file missing, marking failed");
            missing.push(index);
        }

        if !missing.is_empty() {
            let now = now_utc();
            for index in missing {
                let row = &mut table[index];
                row.status_fb = VideoStatus::Failed;
                row.updated_at = now;
            }
            self.write_rows(&table)?;
        }

        Ok(found)
    }

    fn read_rows(&self) -> Result<Vec<VideoRecord>> {
        let path = self.layout.inventory_path();
        let reader = BufReader::new(File::open(&path)?);
        let mut rows = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record =
                serde_json::from_str(&line).map_err(|source| InventoryError::Corrupt {
                    path: path.clone(),
                    line: index + 1,
                    source,
                })?;
            rows.push(record);
        }
        Ok(rows)
    }

    /// Whole-file replacement: write to a temp file in the same directory,
    /// fsync, then rename over the table. Readers never see a partial write.
    fn write_rows(&self, rows: &[VideoRecord]) -> Result<()> {
        let data_dir = self.layout.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let mut tmp = NamedTempFile::new_in(&data_dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            for row in rows {
                serde_json::to_writer(&mut writer, row)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(self.layout.inventory_path())
            .map_err(|err| InventoryError::Io(err.error))?;
        Ok(())
    }
}

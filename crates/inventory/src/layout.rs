//! Project-root-relative directory layout.
//!
//! All paths stored in the inventory are relative to a single base directory
//! so the whole tree stays portable.

use std::io;
use std::path::{Path, PathBuf};

/// Path segment identifying a raw (freshly downloaded) asset.
pub const RAW_SEGMENT: &str = "raw";
/// Path segment identifying a processed (transformed) asset.
pub const PROCESSED_SEGMENT: &str = "processed";

const INVENTORY_FILE: &str = "inventory.jsonl";
const LOCK_FILE: &str = "inventory.lock";
const LOG_FILE: &str = "pipeline.log";

/// Directory layout rooted at the project base directory.
#[derive(Debug, Clone)]
pub struct Layout {
    base_dir: PathBuf,
}

impl Layout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.base_dir.join("videos")
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.videos_dir().join(RAW_SEGMENT)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.videos_dir().join(PROCESSED_SEGMENT)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir().join(INVENTORY_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir().join(LOCK_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE)
    }

    /// Create the basic folders if they don't exist.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [
            self.data_dir(),
            self.raw_dir(),
            self.processed_dir(),
            self.logs_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Resolve a stored `path_local` against the base directory.
    pub fn resolve(&self, path_local: &str) -> PathBuf {
        self.base_dir.join(path_local)
    }

    /// Express an absolute path as a base-relative `path_local` string.
    ///
    /// Returns `None` when the path is outside the base directory.
    pub fn relativize(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.base_dir)
            .ok()
            .map(|rel| rel.to_string_lossy().into_owned())
    }
}

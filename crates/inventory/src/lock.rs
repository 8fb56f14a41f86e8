//! Process-level mutual exclusion over the inventory file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{trace, warn};

use crate::error::{InventoryError, Result};

/// Exclusive advisory lock on an on-disk lock file.
///
/// At most one holder across all cooperating processes at a time. Acquisition
/// polls `try_lock_exclusive` until `timeout` elapses; the underlying flock
/// primitive has no timeout of its own. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    pub fn acquire(path: &Path, timeout: Duration, poll_interval: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).write(true).open(path)?;

        let started = Instant::now();
        let contended_kind = fs2::lock_contended_error().kind();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    trace!(path = %path.display(), "acquired inventory lock");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if err.kind() == contended_kind => {
                    if started.elapsed() >= timeout {
                        warn!(path = %path.display(), waited_ms = timeout.as_millis() as u64,
                            "gave up waiting for inventory lock");
                        return Err(InventoryError::LockTimeout {
                            path: path.to_path_buf(),
                            waited: timeout,
                        });
                    }
                    std::thread::sleep(poll_interval);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %err, "failed to release inventory lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(5);

    #[test]
    fn second_acquire_times_out_while_held() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inventory.lock");

        let held = StoreLock::acquire(&path, Duration::from_secs(1), POLL).expect("first acquire");
        let denied = StoreLock::acquire(&path, Duration::from_millis(50), POLL);
        assert!(matches!(
            denied,
            Err(InventoryError::LockTimeout { .. })
        ));

        drop(held);
        StoreLock::acquire(&path, Duration::from_secs(1), POLL).expect("acquire after release");
    }
}

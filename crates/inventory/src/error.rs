use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt inventory at {} (line {line}): {source}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode inventory row: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("timed out acquiring inventory lock at {} after {waited:?}", path.display())]
    LockTimeout { path: PathBuf, waited: Duration },
}

pub type Result<T> = std::result::Result<T, InventoryError>;

use std::path::PathBuf;

use reel_edit::EditError;
use reel_ingest::IngestError;
use reel_inventory::InventoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    #[error("invalid config at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

use reel_inventory::InventoryError;
use thiserror::Error;

use crate::extractor::ExtractorError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to fetch listing for {url}: {source}")]
    Listing {
        url: String,
        #[source]
        source: ExtractorError,
    },

    #[error("failed to download {url} after {attempts} attempts: {source}")]
    Download {
        url: String,
        attempts: u32,
        #[source]
        source: ExtractorError,
    },

    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

pub type Result<T> = std::result::Result<T, IngestError>;

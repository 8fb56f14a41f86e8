use reel_inventory::InventoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

pub type Result<T> = std::result::Result<T, EditError>;

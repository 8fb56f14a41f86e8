//! # reel-inventory
//!
//! File-backed inventory of video records shared by the ingestion, editing
//! and publishing collaborators. One flat JSON-lines table plus a sibling
//! lock file; all mutations are locked whole-file read-modify-write, so
//! concurrent processes serialize through the lock and readers never observe
//! a torn table.

mod error;
mod layout;
mod lock;
mod record;
mod store;

pub use error::{InventoryError, Result};
pub use layout::{Layout, PROCESSED_SEGMENT, RAW_SEGMENT};
pub use lock::StoreLock;
pub use record::{COLUMN_NAMES, RecordUpdate, VideoRecord, VideoStatus, now_utc};
pub use store::{Inventory, StoreConfig};

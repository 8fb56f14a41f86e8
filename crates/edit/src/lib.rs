//! # reel-edit
//!
//! The editing collaborator: picks up `pending` rows pointing at raw assets,
//! applies a placeholder visual transform (delegated to ffmpeg, effect
//! chosen at random) and moves the result to `videos/processed/`, driving
//! the row to `ready` or `failed`.

mod editor;
mod error;
mod transform;

pub use editor::Editor;
pub use error::{EditError, Result};
pub use transform::{FfmpegTransformer, RelocateTransformer, TransformError, Transformer};

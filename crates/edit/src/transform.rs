//! Transformer contract plus the two production implementations: ffmpeg
//! with a randomly chosen placeholder effect, and a plain relocation for
//! hosts without ffmpeg.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::LazyLock;

use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transformer binary not available: {0}")]
    BinaryUnavailable(String),

    #[error("ffmpeg exited with {status}: {stderr}")]
    CommandFailed { status: ExitStatus, stderr: String },
}

/// Turns a raw asset at `src` into a processed asset at `dst`.
///
/// On success the raw file must no longer exist at `src`; the editor treats
/// the pair as a move.
pub trait Transformer {
    fn name(&self) -> &'static str;
    fn transform(&self, src: &Path, dst: &Path) -> Result<(), TransformError>;
}

/// Placeholder visual effects, one picked at random per video.
const EFFECTS: &[(&str, &str)] = &[
    ("mirror", "hflip"),
    ("brighten", "eq=brightness=0.06"),
    ("soften", "boxblur=2:1"),
    ("desaturate", "hue=s=0"),
];

static DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

static FFMPEG_AVAILABLE: LazyLock<bool> = LazyLock::new(|| {
    Command::new(DEFAULT_FFMPEG_PATH)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
});

#[derive(Debug, Clone)]
pub struct FfmpegTransformer {
    binary_path: String,
}

impl FfmpegTransformer {
    pub fn new() -> Self {
        Self::with_binary_path(
            std::env::var("FFMPEG_PATH").unwrap_or_else(|_| DEFAULT_FFMPEG_PATH.to_string()),
        )
    }

    pub fn with_binary_path(path: impl Into<String>) -> Self {
        Self {
            binary_path: path.into(),
        }
    }

    /// Whether the default `ffmpeg` binary answers `-version`.
    pub fn is_available() -> bool {
        *FFMPEG_AVAILABLE
    }
}

impl Default for FfmpegTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for FfmpegTransformer {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn transform(&self, src: &Path, dst: &Path) -> Result<(), TransformError> {
        let (effect, filter) = EFFECTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(EFFECTS[0]);
        debug!(effect, src = %src.display(), dst = %dst.display(), "applying placeholder effect");

        let output = Command::new(&self.binary_path)
            .args(["-y", "-i"])
            .arg(src)
            .args(["-vf", filter, "-c:a", "copy"])
            .arg(dst)
            .output()
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    TransformError::BinaryUnavailable(self.binary_path.clone())
                } else {
                    TransformError::Io(err)
                }
            })?;

        if !output.status.success() {
            // Don't leave a half-written processed file behind.
            let _ = std::fs::remove_file(dst);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TransformError::CommandFailed {
                status: output.status,
                stderr,
            });
        }

        if let Err(err) = std::fs::remove_file(src) {
            warn!(src = %src.display(), error = %err, "could not remove raw file after transform");
        }
        Ok(())
    }
}

/// Moves the file unchanged. Used when ffmpeg is unavailable or effects are
/// disabled in configuration.
#[derive(Debug, Clone, Default)]
pub struct RelocateTransformer;

impl Transformer for RelocateTransformer {
    fn name(&self) -> &'static str {
        "relocate"
    }

    fn transform(&self, src: &Path, dst: &Path) -> Result<(), TransformError> {
        match std::fs::rename(src, dst) {
            Ok(()) => Ok(()),
            // Cross-device moves fall back to copy-then-remove.
            Err(_) => {
                std::fs::copy(src, dst)?;
                std::fs::remove_file(src)?;
                Ok(())
            }
        }
    }
}

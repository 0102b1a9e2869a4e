use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for counter stamping.
///
/// Each variant carries the context of its failure domain (filesystem, image
/// codec, font loading, text placement) so callers can report a precise cause
/// without parsing error strings. Sources are `Send + Sync` because stamping
/// may run on a rayon pool.
#[derive(Error, Debug)]
pub enum StampError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Font error: failed to load {path:?}")]
    Font {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Text overflow: counter {counter} would be drawn at ({x}, {y}), outside the image")]
    TextOverflow { counter: u32, x: i64, y: i64 },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },

    #[error("{failed} of {total} images could not be generated")]
    PartialFailure { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, StampError>;

impl StampError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Call sites that know the path and operation construct
/// `StampError::FileSystem` directly; this is the fallback for the rest.
impl From<std::io::Error> for StampError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for StampError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

/// Thread pool construction only fails on OS resource exhaustion, which is
/// reported as a configuration problem with the requested job count.
impl From<rayon::ThreadPoolBuildError> for StampError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::Configuration {
            message: format!("スレッドプール作成に失敗しました: {err}"),
        }
    }
}

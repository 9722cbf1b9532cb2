//! Error types module
//!
//! All pipeline errors are unified under the `UplinkError` enum. Errors
//! are raised at the point of use and always name the path that caused
//! them, so a failure for one input never has to abort the rest of a
//! batch.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UplinkError {
    /// Path does not exist, is empty, is a directory where directories
    /// are forbidden, or names a missing explicit thumbnail file.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File exceeds the transport's maximum object size and the active
    /// size policy forbids splitting.
    #[error("\"{}\" is too large for the transport ({size} bytes, limit {limit})", .path.display())]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// Automatic thumbnail derivation failed. Recovered locally: the
    /// unit proceeds without a thumbnail.
    #[error("thumbnail derivation failed for \"{}\": {message}", .path.display())]
    ThumbnailDerivation { path: PathBuf, message: String },

    /// Thumbnail configuration value is not a usable path.
    #[error("invalid thumbnail value: {0:?}")]
    InvalidThumbnailType(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for pipeline operations
pub type UplinkResult<T> = Result<T, UplinkError>;

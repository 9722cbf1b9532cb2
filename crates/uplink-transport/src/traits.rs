//! Transport abstraction trait
//!
//! This module defines the trait every delivery backend must
//! implement. The pipeline never couples to a concrete backend: it
//! produces units sized against `max_object_size` and the transport
//! reads each unit's stream to completion.

use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

use uplink_core::UnitMeta;

/// Transport operation errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Unit rejected: {0}")]
    Rejected(String),

    #[error("Invalid unit name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Delivery backend abstraction
///
/// Implementations receive units one at a time and are responsible for
/// reading each payload to completion before the next unit is sent.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Largest single object this transport accepts, in bytes.
    fn max_object_size(&self) -> u64;

    /// Deliver one unit, consuming its byte stream.
    ///
    /// Returns the delivered location (backend-specific: a path, a
    /// key, a message id).
    async fn send(
        &self,
        meta: UnitMeta,
        payload: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> TransportResult<String>;
}

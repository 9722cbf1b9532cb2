//! Uplink Core Library
//!
//! This crate provides the error taxonomy, configuration, unit models,
//! caption rendering, and media classification shared across all uplink
//! components.

pub mod caption;
pub mod config;
pub mod constants;
pub mod error;
pub mod media_kind;
pub mod models;

// Re-export commonly used types
pub use config::{ThumbnailMode, UploadConfig};
pub use error::{UplinkError, UplinkResult};
pub use media_kind::MediaKind;
pub use models::{MediaAttribute, UnitMeta};

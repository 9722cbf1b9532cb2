//! Configuration module
//!
//! Environment-driven configuration for the upload pipeline. CLI flags
//! may override individual fields after `from_env`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{DEFAULT_MAX_CAPTION_LENGTH, DEFAULT_MAX_OBJECT_SIZE_MB};
use crate::error::UplinkError;

/// How a unit's thumbnail is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailMode {
    /// Derive a thumbnail automatically for media inputs.
    Auto,
    /// Never attach a thumbnail.
    Disabled,
    /// Use this image file for every unit.
    Explicit(PathBuf),
}

impl FromStr for ThumbnailMode {
    type Err = UplinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(UplinkError::InvalidThumbnailType(s.to_string())),
            "auto" => Ok(ThumbnailMode::Auto),
            "none" | "off" => Ok(ThumbnailMode::Disabled),
            path => Ok(ThumbnailMode::Explicit(PathBuf::from(path))),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Largest single object the transport accepts, in bytes.
    pub max_object_size: u64,
    /// Maximum caption length in characters.
    pub max_caption_length: usize,
    pub thumbnail: ThumbnailMode,
    /// Send every unit as a plain document, suppressing media
    /// attributes and automatic thumbnails.
    pub force_document: bool,
    pub caption_template: Option<String>,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            max_object_size: DEFAULT_MAX_OBJECT_SIZE_MB * 1024 * 1024,
            max_caption_length: DEFAULT_MAX_CAPTION_LENGTH,
            thumbnail: ThumbnailMode::Auto,
            force_document: false,
            caption_template: None,
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_object_size = env::var("UPLINK_MAX_OBJECT_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_OBJECT_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(DEFAULT_MAX_OBJECT_SIZE_MB)
            * 1024
            * 1024;

        let max_caption_length = env::var("UPLINK_MAX_CAPTION_LENGTH")
            .unwrap_or_else(|_| DEFAULT_MAX_CAPTION_LENGTH.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_CAPTION_LENGTH);

        let thumbnail = match env::var("UPLINK_THUMBNAIL") {
            Ok(value) => value.parse::<ThumbnailMode>()?,
            Err(_) => ThumbnailMode::Auto,
        };

        let config = UploadConfig {
            max_object_size,
            max_caption_length,
            thumbnail,
            force_document: env::var("UPLINK_FORCE_DOCUMENT")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            caption_template: env::var("UPLINK_CAPTION_TEMPLATE")
                .ok()
                .filter(|s| !s.is_empty()),
            ffprobe_path: env::var("UPLINK_FFPROBE_PATH")
                .unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("UPLINK_FFMPEG_PATH")
                .or_else(|_| env::var("FFMPEG_PATH"))
                .unwrap_or_else(|_| "ffmpeg".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_object_size == 0 {
            return Err(anyhow::anyhow!(
                "UPLINK_MAX_OBJECT_SIZE_MB must be greater than zero"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = UploadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thumbnail, ThumbnailMode::Auto);
        assert!(!config.force_document);
    }

    #[test]
    fn zero_max_object_size_is_rejected() {
        let config = UploadConfig {
            max_object_size: 0,
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn thumbnail_mode_parses() {
        assert_eq!("auto".parse::<ThumbnailMode>().unwrap(), ThumbnailMode::Auto);
        assert_eq!(
            "none".parse::<ThumbnailMode>().unwrap(),
            ThumbnailMode::Disabled
        );
        assert_eq!(
            "/tmp/thumb.jpg".parse::<ThumbnailMode>().unwrap(),
            ThumbnailMode::Explicit(PathBuf::from("/tmp/thumb.jpg"))
        );
        assert!(matches!(
            "".parse::<ThumbnailMode>(),
            Err(UplinkError::InvalidThumbnailType(_))
        ));
    }
}

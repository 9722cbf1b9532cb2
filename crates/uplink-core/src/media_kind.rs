//! Coarse media classification.
//!
//! A pure function over a static extension table with a MIME-guess
//! fallback. No global registry or shared mutable state is involved;
//! the table covers the formats the pipeline cares about and everything
//! else degrades to `Other` via the fallback.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

/// Coarse media kind of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Other,
}

/// Known extensions, checked before the MIME fallback.
const EXTENSION_TABLE: &[(&str, MediaKind)] = &[
    ("jpg", MediaKind::Image),
    ("jpeg", MediaKind::Image),
    ("png", MediaKind::Image),
    ("gif", MediaKind::Image),
    ("webp", MediaKind::Image),
    ("mp4", MediaKind::Video),
    ("m4v", MediaKind::Video),
    ("mov", MediaKind::Video),
    ("avi", MediaKind::Video),
    ("webm", MediaKind::Video),
    ("mkv", MediaKind::Video),
    ("mp3", MediaKind::Audio),
    ("m4a", MediaKind::Audio),
    ("wav", MediaKind::Audio),
    ("flac", MediaKind::Audio),
    ("ogg", MediaKind::Audio),
];

impl MediaKind {
    /// Classify a path by extension, falling back to a MIME guess for
    /// extensions outside the static table.
    pub fn from_path(path: &Path) -> MediaKind {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        if let Some(ext) = &ext {
            if let Some((_, kind)) = EXTENSION_TABLE.iter().find(|(e, _)| e == ext) {
                return *kind;
            }
        }

        let guess = mime_guess::from_path(path).first_or_octet_stream();
        match guess.type_().as_str() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "other" => Ok(MediaKind::Other),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Other => write!(f, "other"),
        }
    }
}

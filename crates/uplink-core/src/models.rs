//! Unit models exchanged between the pipeline and transports.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One attribute attached to an uploadable unit.
///
/// Video attributes are only produced for video-classified inputs;
/// units forced to plain-document mode carry a bare filename attribute
/// instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaAttribute {
    Filename {
        name: String,
    },
    Video {
        duration_secs: u32,
        width: u32,
        height: u32,
        supports_streaming: bool,
    },
}

/// Externally observable surface of a unit, handed to a transport
/// together with the unit's byte stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitMeta {
    pub name: String,
    pub size: u64,
    pub caption: String,
    pub attributes: Vec<MediaAttribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
}

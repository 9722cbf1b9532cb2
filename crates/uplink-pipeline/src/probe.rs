//! ffprobe/ffmpeg-backed media introspection.
//!
//! Classification is a pure extension lookup; duration, dimensions and
//! the streaming flag come from ffprobe's JSON output, and thumbnails
//! from a single-frame ffmpeg extraction into a temp file owned by the
//! unit.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use uplink_core::MediaKind;

/// Structured video metadata, with unknown fields defaulted to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoProbe {
    pub duration_secs: u32,
    pub width: u32,
    pub height: u32,
    /// True only for the MP4/QuickTime container family.
    pub supports_streaming: bool,
}

impl VideoProbe {
    /// Build from ffprobe's `-print_format json` output.
    fn from_probe_json(probe: &serde_json::Value) -> VideoProbe {
        let format = &probe["format"];
        let stream = &probe["streams"][0];

        let duration_secs = format["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0) as u32;
        let width = stream["width"].as_u64().unwrap_or(0) as u32;
        let height = stream["height"].as_u64().unwrap_or(0) as u32;
        let supports_streaming = format["format_name"]
            .as_str()
            .map(|name| name.split(',').any(|n| n == "mp4"))
            .unwrap_or(false);

        VideoProbe {
            duration_secs,
            width,
            height,
            supports_streaming,
        }
    }
}

pub struct MediaIntrospector {
    ffprobe_path: String,
    ffmpeg_path: String,
}

impl MediaIntrospector {
    pub fn new(ffprobe_path: impl Into<String>, ffmpeg_path: impl Into<String>) -> Self {
        MediaIntrospector {
            ffprobe_path: ffprobe_path.into(),
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Coarse media kind of a path.
    pub fn classify(&self, path: &Path) -> MediaKind {
        MediaKind::from_path(path)
    }

    /// Probe a video file for duration, dimensions and container
    /// format. Fields ffprobe cannot determine default to zero.
    pub async fn video_attributes(&self, video_path: &Path) -> Result<VideoProbe> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(video_path)
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let probe: serde_json::Value =
            serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;
        let attrs = VideoProbe::from_probe_json(&probe);

        tracing::info!(
            path = %video_path.display(),
            duration_secs = attrs.duration_secs,
            width = attrs.width,
            height = attrs.height,
            supports_streaming = attrs.supports_streaming,
            "Video probe completed"
        );

        Ok(attrs)
    }

    /// Derive a representative thumbnail for a video file.
    ///
    /// Non-video inputs yield `None` without running ffmpeg. The frame
    /// is taken a tenth of the way into the clip, or at zero when the
    /// duration is unknown.
    pub async fn derive_thumbnail(&self, path: &Path) -> Result<Option<tempfile::TempPath>> {
        if !self.classify(path).is_video() {
            return Ok(None);
        }

        let timestamp = match self.video_attributes(path).await {
            Ok(attrs) => f64::from(attrs.duration_secs) / 10.0,
            Err(_) => 0.0,
        };

        let output_path = tempfile::Builder::new()
            .prefix("uplink-thumb-")
            .suffix(".jpg")
            .tempfile()
            .context("Failed to create thumbnail temp file")?
            .into_temp_path();

        let output = Command::new(&self.ffmpeg_path)
            .args(["-ss", &timestamp.to_string(), "-i"])
            .arg(path)
            .args(["-vframes", "1", "-q:v", "2", "-y"])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffmpeg thumbnail extraction failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        tracing::info!(
            path = %path.display(),
            thumbnail = %output_path.display(),
            "Thumbnail derived"
        );

        Ok(Some(output_path))
    }
}

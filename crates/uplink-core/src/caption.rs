//! Caption rendering and truncation.
//!
//! Templates are plain strings with named placeholders rendered against
//! the unit's path-derived fields and the current timestamp:
//! `{path}`, `{dir}`, `{name}`, `{stem}`, `{ext}`, `{now}`.

use chrono::{DateTime, Local};
use std::path::Path;

/// Render a caption template for a path at a point in time.
///
/// Unknown placeholders are left untouched; missing path components
/// render as empty strings.
pub fn render(template: &str, path: &Path, now: DateTime<Local>) -> String {
    let dir = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    template
        .replace("{path}", &path.display().to_string())
        .replace("{dir}", &dir)
        .replace("{name}", name)
        .replace("{stem}", stem)
        .replace("{ext}", ext)
        .replace("{now}", &now.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Truncate a string to at most `max_len` characters.
///
/// Bounds by char count, never splitting a multi-byte sequence.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

//! Pipeline composition: traversal → size policy → unit production.
//!
//! `UploadPipeline` is a pull-based producer: nothing is opened or
//! planned until the consumer asks for the next unit, and an error for
//! one input never blocks the inputs after it — the offending path is
//! consumed along with its error.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::Local;

use uplink_core::models::MediaAttribute;
use uplink_core::{caption, MediaKind, ThumbnailMode, UplinkError, UplinkResult, UploadConfig};

use crate::probe::MediaIntrospector;
use crate::split::{plan_parts, SplitRange};
use crate::traversal::{FileIter, Traversal};
use crate::virtual_file::{Thumbnail, VirtualFile};

/// Oversized-file policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// Fail on any file larger than the maximum object size.
    Reject,
    /// Partition oversized files into transport-sized slices.
    Split,
}

/// Check that a path exists and is non-empty.
///
/// Never fails: returns whether the path is usable and, when it is
/// not, a description of the problem.
pub fn check_exists(path: &Path) -> (bool, Option<String>) {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => {
            return (
                false,
                Some(format!("File \"{}\" does not exist", path.display())),
            )
        }
    };
    if meta.is_file() && meta.len() == 0 {
        return (false, Some(format!("File \"{}\" is empty", path.display())));
    }
    (true, None)
}

/// Batch pre-filter: report each invalid path and keep the rest.
pub fn filter_existing(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| {
            let (valid, message) = check_exists(path);
            if let Some(message) = message {
                tracing::error!("{message}");
            }
            valid
        })
        .collect()
}

/// Planned parts of the oversized file currently being sliced.
struct PartQueue {
    path: PathBuf,
    source_len: u64,
    ranges: VecDeque<SplitRange>,
}

pub struct UploadPipeline {
    config: UploadConfig,
    introspector: MediaIntrospector,
    traversal: Traversal,
    size_rule: SizeRule,
    inputs: VecDeque<PathBuf>,
    current: Option<FileIter>,
    parts: Option<PartQueue>,
}

impl UploadPipeline {
    pub fn new(
        paths: Vec<PathBuf>,
        config: UploadConfig,
        traversal: Traversal,
        size_rule: SizeRule,
    ) -> Self {
        let introspector =
            MediaIntrospector::new(config.ffprobe_path.clone(), config.ffmpeg_path.clone());
        UploadPipeline {
            config,
            introspector,
            traversal,
            size_rule,
            inputs: paths.into(),
            current: None,
            parts: None,
        }
    }

    /// Pull the next uploadable unit, or `None` once the inputs are
    /// exhausted.
    ///
    /// An error applies to the input that caused it; pulling again
    /// continues with the remaining inputs.
    pub async fn next_unit(&mut self) -> UplinkResult<Option<VirtualFile>> {
        loop {
            if let Some(parts) = self.parts.as_mut() {
                if let Some(range) = parts.ranges.pop_front() {
                    let path = parts.path.clone();
                    let source_len = parts.source_len;
                    return Ok(Some(self.slice_unit(path, source_len, range).await?));
                }
                self.parts = None;
            }

            let Some(path) = self.next_file()? else {
                return Ok(None);
            };
            let size = tokio::fs::metadata(&path).await?.len();

            if size > self.config.max_object_size {
                match self.size_rule {
                    SizeRule::Reject => {
                        return Err(UplinkError::FileTooLarge {
                            path,
                            size,
                            limit: self.config.max_object_size,
                        });
                    }
                    SizeRule::Split => {
                        let base_name = path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or_default()
                            .to_string();
                        let ranges = plan_parts(&base_name, size, self.config.max_object_size);
                        tracing::info!(
                            path = %path.display(),
                            size_bytes = size,
                            parts = ranges.len(),
                            "Splitting oversized file"
                        );
                        self.parts = Some(PartQueue {
                            path,
                            source_len: size,
                            ranges: ranges.into(),
                        });
                        continue;
                    }
                }
            }

            return Ok(Some(self.whole_unit(path, size).await?));
        }
    }

    /// Advance the traversal to the next plain file path.
    fn next_file(&mut self) -> UplinkResult<Option<PathBuf>> {
        loop {
            if let Some(iter) = self.current.as_mut() {
                match iter.next() {
                    Some(Ok(path)) => return Ok(Some(path)),
                    Some(Err(e)) => return Err(e),
                    None => self.current = None,
                }
            }
            match self.inputs.pop_front() {
                Some(input) => self.current = Some(self.traversal.expand(input)?),
                None => return Ok(None),
            }
        }
    }

    async fn whole_unit(&self, path: PathBuf, size: u64) -> UplinkResult<VirtualFile> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let caption = self.resolve_caption(&path, stem);
        let attributes = self.resolve_attributes(&path).await;
        let thumbnail = self.resolve_thumbnail(&path, self.config.force_document).await?;
        Ok(VirtualFile::open_whole(path, size, caption, attributes, thumbnail).await?)
    }

    async fn slice_unit(
        &self,
        path: PathBuf,
        source_len: u64,
        range: SplitRange,
    ) -> UplinkResult<VirtualFile> {
        // Slices always travel as plain documents: media attributes
        // and automatic thumbnails apply to whole files only.
        let caption = self.resolve_caption(&path, range.part_name.clone());
        let attributes = vec![MediaAttribute::Filename {
            name: range.part_name.clone(),
        }];
        let thumbnail = self.resolve_thumbnail(&path, true).await?;
        Ok(VirtualFile::open_slice(path, source_len, &range, caption, attributes, thumbnail)
            .await?)
    }

    fn resolve_caption(&self, path: &Path, default: String) -> String {
        let rendered = match &self.config.caption_template {
            Some(template) => caption::render(template, path, Local::now()),
            None => default,
        };
        caption::truncate(&rendered, self.config.max_caption_length)
    }

    async fn resolve_attributes(&self, path: &Path) -> Vec<MediaAttribute> {
        if self.config.force_document {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            return vec![MediaAttribute::Filename { name }];
        }
        if self.introspector.classify(path) != MediaKind::Video {
            return Vec::new();
        }
        match self.introspector.video_attributes(path).await {
            Ok(probe) => vec![MediaAttribute::Video {
                duration_secs: probe.duration_secs,
                width: probe.width,
                height: probe.height,
                supports_streaming: probe.supports_streaming,
            }],
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{e:#}"),
                    "Video probe failed, sending without attributes"
                );
                Vec::new()
            }
        }
    }

    /// Resolve the thumbnail for one unit.
    ///
    /// Explicit overrides must exist on disk; automatic derivation is
    /// skipped for forced-plain units and its failures are recovered
    /// locally.
    async fn resolve_thumbnail(
        &self,
        path: &Path,
        force_document: bool,
    ) -> UplinkResult<Option<Thumbnail>> {
        match &self.config.thumbnail {
            ThumbnailMode::Disabled => Ok(None),
            ThumbnailMode::Explicit(thumb) => {
                if !thumb.exists() {
                    return Err(UplinkError::InvalidInput(format!(
                        "\"{}\" thumbnail file does not exist",
                        thumb.display()
                    )));
                }
                Ok(Some(Thumbnail::Explicit(thumb.clone())))
            }
            ThumbnailMode::Auto if force_document => Ok(None),
            ThumbnailMode::Auto => {
                match self.introspector.derive_thumbnail(path).await {
                    Ok(temp) => Ok(temp.map(Thumbnail::Derived)),
                    Err(e) => {
                        let err = UplinkError::ThumbnailDerivation {
                            path: path.to_path_buf(),
                            message: format!("{e:#}"),
                        };
                        tracing::warn!("{err}");
                        Ok(None)
                    }
                }
            }
        }
    }
}

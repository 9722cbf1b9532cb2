//! The uploadable unit: a whole file or a byte-range slice of one.
//!
//! Both shapes expose the same surface — name, declared size, caption,
//! attributes, thumbnail, and a readable/seekable byte stream. Slice
//! units enforce a window `[offset, offset + length)` on the underlying
//! file: a remaining-bytes counter caps every read, and consumer seeks
//! restore the invariant `position + remaining == window_end`, so no
//! read can ever return bytes past the window regardless of how the
//! consumer repositions.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, ReadBuf};

use uplink_core::models::{MediaAttribute, UnitMeta};

use crate::split::SplitRange;

/// Read-window state of a unit.
#[derive(Debug)]
enum Window {
    Whole,
    Slice { window_end: u64, remaining: u64 },
}

/// Resolved thumbnail attached to a unit.
///
/// Derived thumbnails live in a temp file owned by the unit and are
/// removed when the unit is dropped.
#[derive(Debug)]
pub(crate) enum Thumbnail {
    Explicit(PathBuf),
    Derived(tempfile::TempPath),
}

impl Thumbnail {
    fn path(&self) -> &Path {
        match self {
            Thumbnail::Explicit(path) => path,
            Thumbnail::Derived(temp) => temp,
        }
    }
}

#[derive(Debug)]
pub struct VirtualFile {
    file: File,
    path: PathBuf,
    name: String,
    size: u64,
    /// Total size of the underlying source file, for end-relative seeks.
    source_len: u64,
    /// Current absolute position in the underlying file.
    pos: u64,
    window: Window,
    seek_in_flight: bool,
    caption: String,
    attributes: Vec<MediaAttribute>,
    thumbnail: Option<Thumbnail>,
}

impl VirtualFile {
    /// Open a whole-file unit.
    pub(crate) async fn open_whole(
        path: PathBuf,
        size: u64,
        caption: String,
        attributes: Vec<MediaAttribute>,
        thumbnail: Option<Thumbnail>,
    ) -> io::Result<Self> {
        let file = File::open(&path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(VirtualFile {
            file,
            path,
            name,
            size,
            source_len: size,
            pos: 0,
            window: Window::Whole,
            seek_in_flight: false,
            caption,
            attributes,
            thumbnail,
        })
    }

    /// Open a slice unit over one planned range of an oversized file.
    pub(crate) async fn open_slice(
        path: PathBuf,
        source_len: u64,
        range: &SplitRange,
        caption: String,
        attributes: Vec<MediaAttribute>,
        thumbnail: Option<Thumbnail>,
    ) -> io::Result<Self> {
        let mut file = File::open(&path).await?;
        // Internal reposition to the slice's starting offset. This
        // establishes the window rather than moving within it, so the
        // remaining counter is not recomputed.
        file.seek(SeekFrom::Start(range.offset)).await?;
        Ok(VirtualFile {
            file,
            path,
            name: range.part_name.clone(),
            size: range.length,
            source_len,
            pos: range.offset,
            window: Window::Slice {
                window_end: range.offset + range.length,
                remaining: range.length,
            },
            seek_in_flight: false,
            caption,
            attributes,
            thumbnail,
        })
    }

    /// Display name: the base name for whole files, the part name for
    /// slices.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared logical size, fixed at construction.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn attributes(&self) -> &[MediaAttribute] {
        &self.attributes
    }

    pub fn thumbnail(&self) -> Option<&Path> {
        self.thumbnail.as_ref().map(|t| t.path())
    }

    /// Path of the underlying source file.
    pub fn source_path(&self) -> &Path {
        &self.path
    }

    /// Split into the transport-facing metadata and the byte stream.
    ///
    /// The returned reader owns the unit (and any derived thumbnail
    /// temp file), so the metadata's thumbnail path stays valid until
    /// the reader is dropped.
    pub fn into_payload(self) -> (UnitMeta, Pin<Box<dyn AsyncRead + Send + Unpin>>) {
        let meta = UnitMeta {
            name: self.name.clone(),
            size: self.size,
            caption: self.caption.clone(),
            attributes: self.attributes.clone(),
            thumbnail: self.thumbnail.as_ref().map(|t| t.path().to_path_buf()),
        };
        (meta, Box::pin(self))
    }

    /// Resolve a seek target to an absolute position in the underlying
    /// file.
    fn absolute_target(&self, target: SeekFrom) -> io::Result<u64> {
        let resolved = match target {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
            SeekFrom::End(delta) => self.source_len.checked_add_signed(delta),
        };
        resolved.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek target before the start of the file",
            )
        })
    }
}

impl AsyncRead for VirtualFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match &mut this.window {
            Window::Whole => {
                let before = buf.filled().len();
                match Pin::new(&mut this.file).poll_read(cx, buf) {
                    Poll::Ready(Ok(())) => {
                        this.pos += (buf.filled().len() - before) as u64;
                        Poll::Ready(Ok(()))
                    }
                    other => other,
                }
            }
            Window::Slice { remaining, .. } => {
                if *remaining == 0 || buf.remaining() == 0 {
                    // Window exhausted: a read here is a clean EOF.
                    return Poll::Ready(Ok(()));
                }
                let allowed = (*remaining).min(buf.remaining() as u64) as usize;
                let n = {
                    let mut limited = ReadBuf::new(buf.initialize_unfilled_to(allowed));
                    match Pin::new(&mut this.file).poll_read(cx, &mut limited) {
                        Poll::Ready(Ok(())) => limited.filled().len(),
                        Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                        Poll::Pending => return Poll::Pending,
                    }
                };
                buf.advance(n);
                *remaining -= n as u64;
                this.pos += n as u64;
                Poll::Ready(Ok(()))
            }
        }
    }
}

impl AsyncSeek for VirtualFile {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        let this = self.get_mut();
        let target = this.absolute_target(position)?;
        if let Window::Slice {
            window_end,
            remaining,
        } = &mut this.window
        {
            // Consumer-driven reposition: re-derive the remaining
            // counter so reads keep honoring the window end. A target
            // past the window leaves nothing to read.
            *remaining = window_end.saturating_sub(target);
        }
        this.seek_in_flight = true;
        Pin::new(&mut this.file).start_seek(SeekFrom::Start(target))
    }

    fn poll_complete(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        let this = self.get_mut();
        match Pin::new(&mut this.file).poll_complete(cx) {
            Poll::Ready(Ok(position)) => {
                if this.seek_in_flight {
                    this.seek_in_flight = false;
                    this.pos = position;
                }
                Poll::Ready(Ok(position))
            }
            other => other,
        }
    }
}

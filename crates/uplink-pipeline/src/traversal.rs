//! Traversal strategies.
//!
//! Expand a mixed list of file and directory paths into a flat
//! sequence of plain file paths. Directories are either walked
//! recursively or rejected outright, selected at pipeline
//! construction.

use std::path::PathBuf;

use uplink_core::{UplinkError, UplinkResult};
use walkdir::WalkDir;

/// Directory handling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Walk directories fully, yielding every contained file.
    Recursive,
    /// Fail on any directory input.
    FilesOnly,
}

/// Lazy expansion of one input path into plain file paths.
pub enum FileIter {
    Single(Option<PathBuf>),
    Walk(Box<walkdir::IntoIter>),
}

impl Iterator for FileIter {
    type Item = UplinkResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FileIter::Single(slot) => slot.take().map(Ok),
            FileIter::Walk(walk) => {
                for entry in walk.by_ref() {
                    match entry {
                        Ok(entry) if entry.file_type().is_file() => {
                            return Some(Ok(entry.into_path()));
                        }
                        // Directory entries themselves are never yielded.
                        Ok(_) => continue,
                        Err(e) => {
                            return Some(Err(UplinkError::Io(std::io::Error::other(e))));
                        }
                    }
                }
                None
            }
        }
    }
}

impl Traversal {
    /// Expand a single input path.
    ///
    /// Plain files pass through unchanged. Directories expand per the
    /// strategy; `FilesOnly` fails immediately, naming the offending
    /// path.
    pub fn expand(&self, path: PathBuf) -> UplinkResult<FileIter> {
        if path.is_dir() {
            match self {
                Traversal::Recursive => Ok(FileIter::Walk(Box::new(
                    WalkDir::new(&path).follow_links(true).into_iter(),
                ))),
                Traversal::FilesOnly => Err(UplinkError::InvalidInput(format!(
                    "\"{}\" is a directory",
                    path.display()
                ))),
            }
        } else {
            Ok(FileIter::Single(Some(path)))
        }
    }
}

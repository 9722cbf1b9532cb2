//! Uplink Pipeline Library
//!
//! Turns a list of input paths into a lazy sequence of uploadable
//! units: traversal strategies flatten directories, size policies
//! split or reject oversized files, and each produced unit exposes the
//! uniform virtual-file contract (name, size, caption, attributes,
//! thumbnail, byte stream).

pub mod pipeline;
pub mod probe;
pub mod split;
pub mod traversal;
pub mod virtual_file;

// Re-export commonly used types
pub use pipeline::{check_exists, filter_existing, SizeRule, UploadPipeline};
pub use probe::{MediaIntrospector, VideoProbe};
pub use split::{plan_parts, SplitRange};
pub use traversal::{FileIter, Traversal};
pub use virtual_file::VirtualFile;

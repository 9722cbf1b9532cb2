//! Shared constants.

/// Default transport object-size ceiling in MiB when not configured.
pub const DEFAULT_MAX_OBJECT_SIZE_MB: u64 = 2000;

/// Default maximum caption length in characters.
pub const DEFAULT_MAX_CAPTION_LENGTH: usize = 1024;

/// Zero-padding width for split part indices.
///
/// Fixed rather than derived from the part count: part names are part
/// of the delivered naming contract and downstream consumers key on
/// the existing scheme. Names stop sorting lexicographically at ten or
/// more parts; see DESIGN.md before changing this.
pub const SPLIT_INDEX_PAD: usize = 1;

//! Oversized-file partitioning.
//!
//! Plans the byte ranges that tile a file into transport-sized parts.
//! Ranges are contiguous, non-overlapping, and sum exactly to the
//! file's size; every part except the last has the maximum length.

use uplink_core::constants::SPLIT_INDEX_PAD;

/// One planned slice of an oversized file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRange {
    /// 0-based part number.
    pub index: usize,
    /// Byte offset into the source file.
    pub offset: u64,
    /// Length of this part in bytes.
    pub length: u64,
    /// Delivered name: `{basename}.{index}`, index zero-padded to the
    /// fixed width.
    pub part_name: String,
}

/// Plan the ordered parts for a file of `total_size` bytes under a
/// `max_part_size` ceiling.
///
/// The caller decides when to split; a `total_size` equal to
/// `max_part_size` yields a single part covering the whole file.
/// `total_size` must be greater than zero.
pub fn plan_parts(base_name: &str, total_size: u64, max_part_size: u64) -> Vec<SplitRange> {
    let parts = total_size.div_ceil(max_part_size);
    (0..parts)
        .map(|index| {
            let offset = index * max_part_size;
            let length = if index == parts - 1 {
                total_size - max_part_size * (parts - 1)
            } else {
                max_part_size
            };
            SplitRange {
                index: index as usize,
                offset,
                length,
                part_name: format!("{}.{:0width$}", base_name, index, width = SPLIT_INDEX_PAD),
            }
        })
        .collect()
}

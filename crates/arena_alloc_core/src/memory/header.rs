//! # Block Headers
//!
//! Fixed-size records stored in place, immediately before every block's
//! payload. Headers are plain `Pod` values copied in and out of the arena
//! bytes; nothing ever holds a reference into the arena across calls.

use bytemuck::{Pod, Zeroable};

/// Size of a block header in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<BlockHeader>();

/// Link value terminating a free list.
pub const LINK_NIL: u64 = u64::MAX;

/// Link value marking a block as handed out to a caller.
///
/// Free-list links are arena offsets and can never reach this value.
pub const LINK_ALLOCATED: u64 = u64::MAX - 1;

/// In-place block header.
///
/// The meaning of `size` depends on the allocator and the block state:
/// free-list spans, free-list payload sizes, or buddy block sizes. The
/// allocators document which one they store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct BlockHeader {
    /// Size field (see type docs).
    pub size: u64,
    /// Next free block offset, [`LINK_NIL`] or [`LINK_ALLOCATED`].
    pub next: u64,
}

impl BlockHeader {
    /// Creates the header of a free block linked to `next`.
    #[inline]
    #[must_use]
    pub const fn free(size: usize, next: Option<usize>) -> Self {
        Self {
            size: size as u64,
            next: encode_link(next),
        }
    }

    /// Creates the header of an allocated block.
    #[inline]
    #[must_use]
    pub const fn allocated(size: usize) -> Self {
        Self {
            size: size as u64,
            next: LINK_ALLOCATED,
        }
    }

    /// Returns the size field.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // sizes are written from usize
    pub const fn size(&self) -> usize {
        self.size as usize
    }

    /// Returns true if the block carries the allocated tag.
    #[inline]
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.next == LINK_ALLOCATED
    }

    /// Returns the offset of the next free block, if any.
    ///
    /// Allocated blocks have no successor.
    #[inline]
    #[must_use]
    pub const fn next_offset(&self) -> Option<usize> {
        decode_link(self.next)
    }
}

/// Encodes an optional arena offset as a header link.
#[inline]
#[must_use]
pub const fn encode_link(offset: Option<usize>) -> u64 {
    match offset {
        Some(offset) => offset as u64,
        None => LINK_NIL,
    }
}

/// Decodes a header link into an arena offset.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)] // links are written from usize
pub const fn decode_link(link: u64) -> Option<usize> {
    if link == LINK_NIL || link == LINK_ALLOCATED {
        None
    } else {
        Some(link as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_sixteen_bytes() {
        assert_eq!(HEADER_SIZE, 16);
    }

    #[test]
    fn test_free_header_links() {
        let tail = BlockHeader::free(64, None);
        assert_eq!(tail.next_offset(), None);
        assert!(!tail.is_allocated());

        let linked = BlockHeader::free(64, Some(128));
        assert_eq!(linked.next_offset(), Some(128));
        assert_eq!(linked.size(), 64);
    }

    #[test]
    fn test_allocated_header_has_no_successor() {
        let header = BlockHeader::allocated(100);
        assert!(header.is_allocated());
        assert_eq!(header.next_offset(), None);
        assert_eq!(header.size(), 100);
    }

    #[test]
    fn test_offset_zero_is_a_valid_link() {
        assert_eq!(decode_link(encode_link(Some(0))), Some(0));
    }
}

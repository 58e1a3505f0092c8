//! # Free-List Allocator
//!
//! First-fit allocator over a single singly-linked list of free blocks.
//!
//! ## Layout
//!
//! ```text
//! [16 bytes: control block (usable size, free-list head)]
//! [block][block][block]...               <- usable space
//!
//! block = [16 bytes: header (size, next)][payload]
//! ```
//!
//! A free block's `size` is its whole span, header included. An allocated
//! block's `size` is the payload size that was handed out, and its link
//! carries the allocated tag. Release converts the payload size back into a
//! span and pushes the block on the front of the list. Adjacent free blocks
//! are never merged.

use bytemuck::{Pod, Zeroable};

use super::{AllocatorStats, ArenaAllocator, Block, Strategy};
use crate::error::{AllocError, AllocResult};
use crate::memory::{decode_link, encode_link, Arena, BlockHeader, HEADER_SIZE};

/// Allocator state stored at the front of the arena.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct ControlBlock {
    /// Bytes after the control block.
    usable: u64,
    /// Link to the first free block.
    head: u64,
}

/// Bytes reserved at the front of the arena for the control block.
pub const CONTROL_SIZE: usize = std::mem::size_of::<ControlBlock>();

/// A free block as seen by a list walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeBlockInfo {
    /// Offset of the block header.
    pub offset: usize,
    /// Span of the block, header included.
    pub size: usize,
}

impl FreeBlockInfo {
    /// Largest payload this block could hold.
    #[inline]
    #[must_use]
    pub const fn payload_capacity(&self) -> usize {
        self.size - HEADER_SIZE
    }
}

/// First-fit, splitting allocator over a caller-supplied arena.
///
/// # Thread Safety
///
/// NOT thread-safe. Every mutating call takes `&mut self`.
///
/// # Example
///
/// ```rust
/// use arena_alloc_core::{ArenaAllocator, FreeListAllocator};
///
/// let mut bytes = vec![0u8; 4096];
/// let mut heap = FreeListAllocator::create(&mut bytes).unwrap();
///
/// let block = heap.alloc(100).unwrap();
/// heap.payload_mut(&block).fill(0xAB);
/// heap.free(block);
/// ```
#[derive(Debug)]
pub struct FreeListAllocator<'a> {
    /// The managed region, control block first.
    arena: Arena<'a>,
    /// Counters.
    stats: AllocatorStats,
}

impl<'a> FreeListAllocator<'a> {
    /// Smallest region that can host the control block and one header.
    pub const MIN_ARENA_SIZE: usize = CONTROL_SIZE + HEADER_SIZE;

    /// Takes over `bytes` and installs one free block spanning all usable
    /// space.
    ///
    /// # Errors
    ///
    /// [`AllocError::ArenaTooSmall`] if `bytes` is shorter than
    /// [`Self::MIN_ARENA_SIZE`].
    pub fn create(bytes: &'a mut [u8]) -> AllocResult<Self> {
        let size = bytes.len();
        if size < Self::MIN_ARENA_SIZE {
            tracing::debug!(size, required = Self::MIN_ARENA_SIZE, "free-list arena too small");
            return Err(AllocError::ArenaTooSmall {
                size,
                required: Self::MIN_ARENA_SIZE,
            });
        }

        let usable = size - CONTROL_SIZE;
        let mut arena = Arena::new(bytes);
        arena.write(
            0,
            &ControlBlock {
                usable: usable as u64,
                head: encode_link(Some(CONTROL_SIZE)),
            },
        );
        arena.set_header(CONTROL_SIZE, BlockHeader::free(usable, None));

        tracing::debug!(size, usable, "free-list allocator created");

        Ok(Self {
            arena,
            stats: AllocatorStats::default(),
        })
    }

    /// Bytes available for blocks (arena minus control block).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn usable_capacity(&self) -> usize {
        self.control().usable as usize
    }

    /// Total arena size in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Walks the free list from the head.
    pub fn free_blocks(&self) -> impl Iterator<Item = FreeBlockInfo> + '_ {
        let mut cursor = self.head();
        std::iter::from_fn(move || {
            let offset = cursor?;
            let header = self.arena.header(offset);
            cursor = header.next_offset();
            Some(FreeBlockInfo {
                offset,
                size: header.size(),
            })
        })
    }

    /// Ends the allocator and hands the region back to its owner.
    ///
    /// The arena bytes are left exactly as they are.
    #[must_use]
    pub fn destroy(self) -> &'a mut [u8] {
        tracing::debug!(
            allocations = self.stats.allocations,
            frees = self.stats.frees,
            "free-list allocator destroyed"
        );
        self.arena.into_inner()
    }

    #[inline]
    fn control(&self) -> ControlBlock {
        self.arena.read(0)
    }

    #[inline]
    fn head(&self) -> Option<usize> {
        decode_link(self.control().head)
    }

    #[inline]
    fn set_head(&mut self, head: Option<usize>) {
        let mut control = self.control();
        control.head = encode_link(head);
        self.arena.write(0, &control);
    }

    #[inline]
    fn set_next(&mut self, offset: usize, next: Option<usize>) {
        let mut header = self.arena.header(offset);
        header.next = encode_link(next);
        self.arena.set_header(offset, header);
    }

    /// Pushes the allocated block at `offset` back on the list front.
    fn release(&mut self, offset: usize) {
        let span = self.arena.header(offset).size() + HEADER_SIZE;
        let head = self.head();
        self.arena.set_header(offset, BlockHeader::free(span, head));
        self.set_head(Some(offset));
        self.stats.record_free(span);

        tracing::trace!(offset, span, "free-list release");
    }
}

impl ArenaAllocator for FreeListAllocator<'_> {
    fn strategy(&self) -> Strategy {
        Strategy::FreeList
    }

    fn alloc(&mut self, size: usize) -> Option<Block> {
        if size == 0 {
            return None;
        }
        let Some(needed) = size.checked_add(HEADER_SIZE) else {
            self.stats.record_failure();
            return None;
        };

        let mut prev: Option<usize> = None;
        let mut cursor = self.head();

        while let Some(offset) = cursor {
            let header = self.arena.header(offset);
            let span = header.size();

            if span >= needed {
                let remainder = span - needed;

                // A remainder with no room for a payload byte stays with
                // the allocation.
                let (successor, payload) = if remainder > HEADER_SIZE {
                    let split_at = offset + needed;
                    self.arena
                        .set_header(split_at, BlockHeader::free(remainder, header.next_offset()));
                    self.stats.splits += 1;
                    tracing::trace!(offset, split_at, remainder, "free-list split");
                    (Some(split_at), size)
                } else {
                    (header.next_offset(), span - HEADER_SIZE)
                };

                match prev {
                    Some(prev) => self.set_next(prev, successor),
                    None => self.set_head(successor),
                }

                self.arena.set_header(offset, BlockHeader::allocated(payload));
                self.stats.record_allocation(payload + HEADER_SIZE);

                tracing::trace!(offset, size, "free-list alloc");
                return Some(Block::new(offset + HEADER_SIZE, size));
            }

            prev = Some(offset);
            cursor = header.next_offset();
        }

        self.stats.record_failure();
        tracing::debug!(size, "free-list out of memory");
        None
    }

    fn free(&mut self, block: Block) {
        self.release(block.header_offset());
    }

    fn free_raw(&mut self, payload: Option<usize>) -> AllocResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };

        if payload < Self::MIN_ARENA_SIZE || !self.arena.fits_header(payload - HEADER_SIZE) {
            return Err(AllocError::InvalidOffset(payload));
        }
        let offset = payload - HEADER_SIZE;
        let header = self.arena.header(offset);
        if !header.is_allocated() {
            return Err(AllocError::NotAllocated(payload));
        }
        if payload
            .checked_add(header.size())
            .map_or(true, |end| end > self.arena.capacity())
        {
            return Err(AllocError::InvalidOffset(payload));
        }

        self.release(offset);
        Ok(())
    }

    fn payload(&self, block: &Block) -> &[u8] {
        self.arena.slice(block.offset(), block.len())
    }

    fn payload_mut(&mut self, block: &Block) -> &mut [u8] {
        self.arena.slice_mut(block.offset(), block.len())
    }

    fn stats(&self) -> &AllocatorStats {
        &self.stats
    }

    fn free_bytes(&self) -> usize {
        self.free_blocks().map(|block| block.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Arena with exactly 1000 usable bytes.
    fn arena_1000() -> Vec<u8> {
        vec![0u8; CONTROL_SIZE + 1000]
    }

    fn free_sizes(heap: &FreeListAllocator<'_>) -> Vec<usize> {
        heap.free_blocks().map(|block| block.size).collect()
    }

    #[test]
    fn test_create_rejects_tiny_arena() {
        let mut bytes = vec![0u8; FreeListAllocator::MIN_ARENA_SIZE - 1];
        let err = FreeListAllocator::create(&mut bytes).unwrap_err();
        assert_eq!(
            err,
            AllocError::ArenaTooSmall {
                size: FreeListAllocator::MIN_ARENA_SIZE - 1,
                required: FreeListAllocator::MIN_ARENA_SIZE,
            }
        );
    }

    #[test]
    fn test_create_installs_one_block() {
        let mut bytes = arena_1000();
        let heap = FreeListAllocator::create(&mut bytes).unwrap();

        assert_eq!(heap.usable_capacity(), 1000);
        let blocks: Vec<_> = heap.free_blocks().collect();
        assert_eq!(blocks, vec![FreeBlockInfo { offset: CONTROL_SIZE, size: 1000 }]);
    }

    #[test]
    fn test_minimal_arena_cannot_serve_anything() {
        let mut bytes = vec![0u8; FreeListAllocator::MIN_ARENA_SIZE];
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        assert_eq!(free_sizes(&heap), vec![HEADER_SIZE]);
        assert!(heap.alloc(1).is_none());
        assert_eq!(heap.stats().failed_allocations, 1);
    }

    #[test]
    fn test_alloc_zero_is_none() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        assert!(heap.alloc(0).is_none());
        assert_eq!(heap.try_alloc(0), Err(AllocError::ZeroSize));
        assert_eq!(free_sizes(&heap), vec![1000]);
    }

    #[test]
    fn test_split_correctness() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        let block = heap.alloc(100).unwrap();
        assert_eq!(block.offset(), CONTROL_SIZE + HEADER_SIZE);
        assert_eq!(block.len(), 100);

        let blocks: Vec<_> = heap.free_blocks().collect();
        assert_eq!(
            blocks,
            vec![FreeBlockInfo {
                offset: CONTROL_SIZE + HEADER_SIZE + 100,
                size: 1000 - 100 - HEADER_SIZE,
            }]
        );
        assert_eq!(heap.arena.header(block.header_offset()), BlockHeader::allocated(100));
        assert_eq!(heap.stats().splits, 1);
    }

    #[test]
    fn test_reference_scenario() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        let first = heap.alloc(100).unwrap();
        assert_eq!(free_sizes(&heap), vec![884]);

        let second = heap.alloc(50).unwrap();
        assert_eq!(free_sizes(&heap), vec![818]);

        let first_offset = first.offset();
        heap.free(first);
        let head = heap.free_blocks().next().unwrap();
        assert_eq!(head.payload_capacity(), 100);

        // Exact reuse of the freed block, not a split of the 818 block.
        let again = heap.alloc(100).unwrap();
        assert_eq!(again.offset(), first_offset);
        assert_eq!(free_sizes(&heap), vec![818]);

        heap.free(again);
        heap.free(second);
        assert_eq!(heap.free_bytes(), 1000);
    }

    #[test]
    fn test_first_fit_takes_first_sufficient_entry() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        let small = heap.alloc(40).unwrap();
        let _guard_a = heap.alloc(8).unwrap();
        let large = heap.alloc(200).unwrap();
        let _guard_b = heap.alloc(8).unwrap();

        let large_offset = large.offset();
        heap.free(small);
        heap.free(large);
        // List: large(216) -> small(56) -> tail.
        let picked = heap.alloc(30).unwrap();
        assert_eq!(picked.offset(), large_offset);
    }

    #[test]
    fn test_lifo_reuse() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        let a = heap.alloc(64).unwrap();
        let _guard_a = heap.alloc(8).unwrap();
        let b = heap.alloc(64).unwrap();
        let _guard_b = heap.alloc(8).unwrap();

        let b_offset = b.offset();
        heap.free(a);
        heap.free(b);

        let reused = heap.alloc(64).unwrap();
        assert_eq!(reused.offset(), b_offset);
    }

    #[test]
    fn test_lifo_head_too_small_falls_through() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        let a = heap.alloc(200).unwrap();
        let _guard_a = heap.alloc(8).unwrap();
        let b = heap.alloc(32).unwrap();
        let _guard_b = heap.alloc(8).unwrap();

        let a_offset = a.offset();
        heap.free(a);
        heap.free(b);

        // B sits at the head but cannot fit 100 bytes; A can.
        let picked = heap.alloc(100).unwrap();
        assert_eq!(picked.offset(), a_offset);
    }

    #[test]
    fn test_no_merge_on_free() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        let a = heap.alloc(100).unwrap();
        let b = heap.alloc(100).unwrap();
        heap.free(a);
        heap.free(b);

        assert_eq!(free_sizes(&heap), vec![116, 116, 768]);
        // 300 bytes would fit in the merged neighbours but not in any piece
        // except the tail.
        let big = heap.alloc(300).unwrap();
        assert_eq!(big.offset(), CONTROL_SIZE + 2 * 116 + HEADER_SIZE);
    }

    #[test]
    fn test_small_remainder_is_absorbed() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        // 1000 - (980 + 16) = 4 bytes left, too small for a header.
        let block = heap.alloc(980).unwrap();
        assert_eq!(heap.free_blocks().count(), 0);
        assert_eq!(heap.arena.header(block.header_offset()).size(), 984);
        assert_eq!(heap.stats().bytes_in_use, 1000);

        heap.free(block);
        assert_eq!(free_sizes(&heap), vec![1000]);
    }

    #[test]
    fn test_header_sized_remainder_is_absorbed() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        // 1000 - (968 + 16) = 16 bytes left: a header with no payload.
        let block = heap.alloc(968).unwrap();
        assert_eq!(heap.free_blocks().count(), 0);
        assert_eq!(heap.arena.header(block.header_offset()).size(), 984);
        assert_eq!(heap.stats().splits, 0);

        heap.free(block);
        assert_eq!(free_sizes(&heap), vec![1000]);
    }

    #[test]
    fn test_out_of_memory() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        assert!(heap.alloc(1000).is_none());
        assert_eq!(
            heap.try_alloc(5000),
            Err(AllocError::OutOfMemory { requested: 5000 })
        );
        assert!(heap.alloc(usize::MAX).is_none());
        assert_eq!(heap.stats().failed_allocations, 3);
    }

    #[test]
    fn test_free_raw() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        assert_eq!(heap.free_raw(None), Ok(()));

        let raw = heap.alloc(100).unwrap().into_raw();
        assert_eq!(heap.free_raw(Some(raw)), Ok(()));
        assert_eq!(heap.free_raw(Some(raw)), Err(AllocError::NotAllocated(raw)));
        assert_eq!(heap.free_raw(Some(3)), Err(AllocError::InvalidOffset(3)));
        assert_eq!(
            heap.free_raw(Some(1_000_000)),
            Err(AllocError::InvalidOffset(1_000_000))
        );
        assert_eq!(heap.free_bytes(), 1000);
    }

    #[test]
    fn test_payload_roundtrip_and_destroy() {
        let mut bytes = arena_1000();
        let mut heap = FreeListAllocator::create(&mut bytes).unwrap();

        let block = heap.alloc(4).unwrap();
        heap.payload_mut(&block).copy_from_slice(b"abcd");
        assert_eq!(heap.payload(&block), b"abcd");

        let range = block.range();
        let bytes = heap.destroy();
        assert_eq!(&bytes[range], b"abcd");
    }
}

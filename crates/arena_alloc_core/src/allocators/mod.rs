//! # Allocators
//!
//! Two strategies over the same arena shape:
//!
//! - [`FreeListAllocator`]: first-fit over one singly-linked free list,
//!   splitting in place, LIFO release, no merging.
//! - [`BuddyAllocator`]: one free list per power-of-two order, splitting on
//!   demand, optional buddy coalescing on release.
//!
//! Both hand out [`Block`] tokens. A token can only be freed once because
//! `free` takes it by value.

mod buddy;
mod free_list;

use std::fmt;
use std::ops::Range;

use crate::error::{AllocError, AllocResult};
use crate::memory::HEADER_SIZE;

pub use buddy::{BuddyAllocator, BuddyConfig};
pub use free_list::{FreeBlockInfo, FreeListAllocator, CONTROL_SIZE};

/// Allocation strategy of an allocator instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// First-fit free list.
    FreeList,
    /// Power-of-two buddy system.
    Buddy,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeList => f.write_str("free-list"),
            Self::Buddy => f.write_str("buddy"),
        }
    }
}

/// Handle to a live allocation.
///
/// Holds the payload offset inside the arena and the requested length.
/// Not `Clone`: passing it to `free` consumes it.
#[must_use = "dropping a Block keeps its bytes allocated until the arena is destroyed"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// Offset of the first payload byte.
    offset: usize,
    /// Requested payload length.
    len: usize,
}

impl Block {
    #[inline]
    pub(crate) const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Offset of the first payload byte inside the arena.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Requested payload length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false: zero-byte blocks are never handed out.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the block header (`offset - HEADER_SIZE`).
    #[inline]
    #[must_use]
    pub const fn header_offset(&self) -> usize {
        self.offset - HEADER_SIZE
    }

    /// Payload byte range inside the arena.
    #[inline]
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Gives up the token and returns the raw payload offset.
    ///
    /// The offset can later be released with `free_raw`.
    #[inline]
    #[must_use]
    pub const fn into_raw(self) -> usize {
        self.offset
    }
}

/// Counters kept by every allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Successful allocations.
    pub allocations: u64,
    /// Blocks released.
    pub frees: u64,
    /// Allocations that returned nothing.
    pub failed_allocations: u64,
    /// Blocks split to serve a request.
    pub splits: u64,
    /// Buddy merges performed on release.
    pub merges: u64,
    /// Arena bytes held by live allocations, headers included.
    pub bytes_in_use: usize,
}

impl AllocatorStats {
    #[inline]
    pub(crate) fn record_allocation(&mut self, span: usize) {
        self.allocations += 1;
        self.bytes_in_use += span;
    }

    #[inline]
    pub(crate) fn record_free(&mut self, span: usize) {
        self.frees += 1;
        self.bytes_in_use = self.bytes_in_use.saturating_sub(span);
    }

    #[inline]
    pub(crate) fn record_failure(&mut self) {
        self.failed_allocations += 1;
    }
}

/// The call contract shared by every arena allocator.
///
/// Implementations are not synchronized; wrap one in
/// [`SharedAllocator`](crate::sync::SharedAllocator) to share it.
pub trait ArenaAllocator {
    /// Strategy implemented by this allocator.
    fn strategy(&self) -> Strategy;

    /// Allocates `size` payload bytes.
    ///
    /// Returns `None` when `size` is zero or no free block fits. The
    /// returned bytes are not zeroed.
    fn alloc(&mut self, size: usize) -> Option<Block>;

    /// Like [`alloc`](Self::alloc), with the failure reason spelled out.
    ///
    /// # Errors
    ///
    /// [`AllocError::ZeroSize`] for a zero request and
    /// [`AllocError::OutOfMemory`] when no free block fits.
    fn try_alloc(&mut self, size: usize) -> AllocResult<Block> {
        if size == 0 {
            return Err(AllocError::ZeroSize);
        }
        self.alloc(size)
            .ok_or(AllocError::OutOfMemory { requested: size })
    }

    /// Releases a block.
    fn free(&mut self, block: Block);

    /// Releases a block by raw payload offset. `None` is a no-op.
    ///
    /// # Errors
    ///
    /// [`AllocError::InvalidOffset`] if the offset cannot name a block of
    /// this arena and [`AllocError::NotAllocated`] if the header there is
    /// not a live allocation.
    fn free_raw(&mut self, payload: Option<usize>) -> AllocResult<()>;

    /// Payload bytes of a live block.
    ///
    /// # Panics
    ///
    /// May panic if `block` was not produced by this allocator.
    fn payload(&self, block: &Block) -> &[u8];

    /// Mutable payload bytes of a live block.
    ///
    /// # Panics
    ///
    /// May panic if `block` was not produced by this allocator.
    fn payload_mut(&mut self, block: &Block) -> &mut [u8];

    /// Allocation counters.
    fn stats(&self) -> &AllocatorStats;

    /// Bytes currently held by free blocks, headers included.
    fn free_bytes(&self) -> usize;
}

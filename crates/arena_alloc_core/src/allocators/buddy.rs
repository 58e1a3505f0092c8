//! # Buddy Allocator
//!
//! Power-of-two allocator with one free list per order.
//!
//! ## Layout
//!
//! The arena is carved into top-order blocks starting at offset 0. Every
//! block, free or allocated, starts with a 16-byte header whose `size` is
//! the block size `2^order`. Free blocks link to the next free block of the
//! same order; allocated blocks carry the allocated tag.
//!
//! The list heads live inline in the allocator handle, a fixed array with
//! one slot per order. Headers and links live in the arena.
//!
//! ## Coalescing
//!
//! By default a released block is pushed on its order's list and never
//! merged with its buddy, so an order can collect blocks that could have
//! formed a larger one. Set [`BuddyConfig::coalesce`] to merge on release:
//! the buddy of the block at `offset` with order `k` sits at
//! `offset ^ 2^k`, and while that buddy is on list `k` the pair is unlinked
//! and re-examined as one block of order `k + 1`.

use super::{AllocatorStats, ArenaAllocator, Block, Strategy};
use crate::error::{AllocError, AllocResult};
use crate::memory::order::{
    block_size, floor_log2, order_for_request, DEFAULT_MAX_ORDER, MAX_SUPPORTED_ORDER, MIN_ORDER,
    ORDER_SLOTS,
};
use crate::memory::{decode_link, encode_link, Arena, BlockHeader, HEADER_SIZE, LINK_NIL};

/// Buddy allocator settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuddyConfig {
    /// Largest block order; the arena must hold at least one such block.
    pub max_order: u32,
    /// Merge free buddies on release.
    pub coalesce: bool,
}

impl Default for BuddyConfig {
    fn default() -> Self {
        Self::observed()
    }
}

impl BuddyConfig {
    /// Order-20 blocks, no coalescing.
    #[must_use]
    pub const fn observed() -> Self {
        Self {
            max_order: DEFAULT_MAX_ORDER,
            coalesce: false,
        }
    }

    /// Order-20 blocks, buddies merged on release.
    #[must_use]
    pub const fn coalescing() -> Self {
        Self {
            max_order: DEFAULT_MAX_ORDER,
            coalesce: true,
        }
    }

    /// Checks the order range.
    ///
    /// # Errors
    ///
    /// [`AllocError::InvalidOrder`] when `max_order` is outside
    /// `MIN_ORDER..=MAX_SUPPORTED_ORDER` or does not fit a `usize` shift.
    pub fn validate(self) -> AllocResult<usize> {
        let invalid = AllocError::InvalidOrder {
            order: self.max_order,
            min: MIN_ORDER,
            max: MAX_SUPPORTED_ORDER,
        };
        if !(MIN_ORDER..=MAX_SUPPORTED_ORDER).contains(&self.max_order) {
            return Err(invalid);
        }
        1usize.checked_shl(self.max_order).ok_or(invalid)
    }
}

/// Power-of-two buddy allocator over a caller-supplied arena.
///
/// # Thread Safety
///
/// NOT thread-safe. Every mutating call takes `&mut self`.
///
/// # Example
///
/// ```rust
/// use arena_alloc_core::{ArenaAllocator, BuddyAllocator};
///
/// let mut bytes = vec![0u8; 1 << 20];
/// let mut buddy = BuddyAllocator::create(&mut bytes).unwrap();
///
/// // 300 + 16 header bytes round up to a 512-byte block.
/// let block = buddy.alloc(300).unwrap();
/// assert_eq!(buddy.free_count(9), 1);
/// buddy.free(block);
/// assert_eq!(buddy.free_count(9), 2);
/// ```
#[derive(Debug)]
pub struct BuddyAllocator<'a> {
    /// The managed region.
    arena: Arena<'a>,
    /// Settings fixed at creation.
    config: BuddyConfig,
    /// Free-list head link per order.
    heads: [u64; ORDER_SLOTS],
    /// Number of top-order blocks carved from the arena.
    roots: usize,
    /// Counters.
    stats: AllocatorStats,
}

impl<'a> BuddyAllocator<'a> {
    /// Creates an allocator with [`BuddyConfig::observed`] settings.
    ///
    /// # Errors
    ///
    /// [`AllocError::ArenaTooSmall`] if `bytes` is shorter than one
    /// order-20 block.
    pub fn create(bytes: &'a mut [u8]) -> AllocResult<Self> {
        Self::with_config(bytes, BuddyConfig::default())
    }

    /// Creates an allocator with explicit settings.
    ///
    /// # Errors
    ///
    /// [`AllocError::InvalidOrder`] for an unsupported `max_order`, and
    /// [`AllocError::ArenaTooSmall`] if `bytes` cannot hold one top-order
    /// block.
    pub fn with_config(bytes: &'a mut [u8], config: BuddyConfig) -> AllocResult<Self> {
        let top = config.validate()?;
        let size = bytes.len();
        if size < top {
            tracing::debug!(size, required = top, "buddy arena too small");
            return Err(AllocError::ArenaTooSmall {
                size,
                required: top,
            });
        }

        let mut allocator = Self {
            arena: Arena::new(bytes),
            config,
            heads: [LINK_NIL; ORDER_SLOTS],
            roots: size / top,
            stats: AllocatorStats::default(),
        };

        // Pushed in reverse so the list runs in ascending offset order.
        for root in (0..allocator.roots).rev() {
            allocator.push(config.max_order, root * top);
        }

        tracing::debug!(
            size,
            max_order = config.max_order,
            roots = allocator.roots,
            coalesce = config.coalesce,
            "buddy allocator created"
        );

        Ok(allocator)
    }

    /// Settings the allocator was created with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> BuddyConfig {
        self.config
    }

    /// Total arena size in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Bytes covered by top-order blocks.
    #[inline]
    #[must_use]
    pub fn managed_capacity(&self) -> usize {
        self.roots * block_size(self.config.max_order)
    }

    /// Trailing bytes too short to form a top-order block.
    #[inline]
    #[must_use]
    pub fn slack(&self) -> usize {
        self.capacity() - self.managed_capacity()
    }

    /// Walks the free list of `order`, yielding block offsets.
    pub fn free_blocks(&self, order: u32) -> impl Iterator<Item = usize> + '_ {
        let mut cursor = decode_link(self.head_link(order));
        std::iter::from_fn(move || {
            let offset = cursor?;
            cursor = self.arena.header(offset).next_offset();
            Some(offset)
        })
    }

    /// Number of free blocks of `order`.
    #[must_use]
    pub fn free_count(&self, order: u32) -> usize {
        self.free_blocks(order).count()
    }

    /// Ends the allocator and hands the region back to its owner.
    ///
    /// The arena bytes are left exactly as they are.
    #[must_use]
    pub fn destroy(self) -> &'a mut [u8] {
        tracing::debug!(
            allocations = self.stats.allocations,
            frees = self.stats.frees,
            merges = self.stats.merges,
            "buddy allocator destroyed"
        );
        self.arena.into_inner()
    }

    #[inline]
    fn head_link(&self, order: u32) -> u64 {
        self.heads.get(order as usize).copied().unwrap_or(LINK_NIL)
    }

    fn push(&mut self, order: u32, offset: usize) {
        let slot = order as usize;
        let next = decode_link(self.heads[slot]);
        self.arena
            .set_header(offset, BlockHeader::free(block_size(order), next));
        self.heads[slot] = encode_link(Some(offset));
    }

    fn pop(&mut self, order: u32) -> Option<usize> {
        let slot = order as usize;
        let offset = decode_link(self.heads[slot])?;
        self.heads[slot] = self.arena.header(offset).next;
        Some(offset)
    }

    /// Removes `target` from the list of `order`. Returns false if it is not
    /// linked there.
    fn unlink(&mut self, order: u32, target: usize) -> bool {
        let slot = order as usize;
        let mut prev: Option<usize> = None;
        let mut cursor = decode_link(self.heads[slot]);

        while let Some(offset) = cursor {
            let header = self.arena.header(offset);
            if offset == target {
                match prev {
                    Some(prev) => {
                        let mut prev_header = self.arena.header(prev);
                        prev_header.next = header.next;
                        self.arena.set_header(prev, prev_header);
                    }
                    None => self.heads[slot] = header.next,
                }
                return true;
            }
            prev = Some(offset);
            cursor = header.next_offset();
        }
        false
    }

    /// Returns the allocated block at `offset` to the free lists.
    fn release(&mut self, offset: usize) {
        let size = self.arena.header(offset).size();
        let mut order = floor_log2(size);
        let mut offset = offset;
        self.stats.record_free(size);

        // Clear the allocated tag first: a merge below may absorb this
        // header into a block that starts at a lower offset.
        self.arena.set_header(offset, BlockHeader::free(size, None));

        while self.config.coalesce && order < self.config.max_order {
            let buddy = offset ^ block_size(order);
            if !self.unlink(order, buddy) {
                break;
            }
            tracing::trace!(offset, buddy, order, "buddy merge");
            offset = offset.min(buddy);
            order += 1;
            self.stats.merges += 1;
        }

        self.push(order, offset);
        tracing::trace!(offset, order, "buddy release");
    }
}

impl ArenaAllocator for BuddyAllocator<'_> {
    fn strategy(&self) -> Strategy {
        Strategy::Buddy
    }

    fn alloc(&mut self, size: usize) -> Option<Block> {
        if size == 0 {
            return None;
        }
        let max_order = self.config.max_order;

        let Some(order) = order_for_request(size).filter(|&order| order <= max_order) else {
            self.stats.record_failure();
            tracing::debug!(size, max_order, "buddy request exceeds top order");
            return None;
        };

        let Some(found) = (order..=max_order).find(|&o| self.head_link(o) != LINK_NIL) else {
            self.stats.record_failure();
            tracing::debug!(size, order, "buddy out of memory");
            return None;
        };
        let offset = self.pop(found)?;

        let mut current = found;
        while current > order {
            current -= 1;
            let buddy = offset + block_size(current);
            self.push(current, buddy);
            self.stats.splits += 1;
            tracing::trace!(offset = buddy, order = current, "buddy split");
        }

        self.arena
            .set_header(offset, BlockHeader::allocated(block_size(order)));
        self.stats.record_allocation(block_size(order));

        tracing::trace!(offset, size, order, "buddy alloc");
        Some(Block::new(offset + HEADER_SIZE, size))
    }

    fn free(&mut self, block: Block) {
        self.release(block.header_offset());
    }

    fn free_raw(&mut self, payload: Option<usize>) -> AllocResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };

        if payload < HEADER_SIZE || !self.arena.fits_header(payload - HEADER_SIZE) {
            return Err(AllocError::InvalidOffset(payload));
        }
        let offset = payload - HEADER_SIZE;
        let header = self.arena.header(offset);
        if !header.is_allocated() {
            return Err(AllocError::NotAllocated(payload));
        }

        let size = header.size();
        let well_formed = size.is_power_of_two()
            && (block_size(MIN_ORDER)..=block_size(self.config.max_order)).contains(&size)
            && offset % size == 0
            && offset + size <= self.managed_capacity();
        if !well_formed {
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
        (MIN_ORDER..=self.config.max_order)
            .map(|order| self.free_count(order) * block_size(order))
            .sum()
    }
}

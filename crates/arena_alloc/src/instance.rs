//! # Allocator Instance
//!
//! One concrete allocator chosen at runtime, driven through the shared
//! [`ArenaAllocator`] contract.

use arena_alloc_core::{
    AllocResult, AllocatorStats, ArenaAllocator, Block, BuddyAllocator, FreeListAllocator,
    Strategy,
};

/// Either allocator, picked by configuration.
#[derive(Debug)]
pub enum AllocatorInstance<'a> {
    /// First-fit free list.
    FreeList(FreeListAllocator<'a>),
    /// Power-of-two buddy system.
    Buddy(BuddyAllocator<'a>),
}

impl<'a> AllocatorInstance<'a> {
    /// Bytes that blocks can be carved from.
    ///
    /// Free list: arena minus control block. Buddy: bytes covered by
    /// top-order blocks.
    #[must_use]
    pub fn managed_capacity(&self) -> usize {
        match self {
            Self::FreeList(heap) => heap.usable_capacity(),
            Self::Buddy(buddy) => buddy.managed_capacity(),
        }
    }

    /// Ends the allocator and hands the region back to its owner.
    #[must_use]
    pub fn destroy(self) -> &'a mut [u8] {
        match self {
            Self::FreeList(heap) => heap.destroy(),
            Self::Buddy(buddy) => buddy.destroy(),
        }
    }
}

impl ArenaAllocator for AllocatorInstance<'_> {
    fn strategy(&self) -> Strategy {
        match self {
            Self::FreeList(heap) => heap.strategy(),
            Self::Buddy(buddy) => buddy.strategy(),
        }
    }

    fn alloc(&mut self, size: usize) -> Option<Block> {
        match self {
            Self::FreeList(heap) => heap.alloc(size),
            Self::Buddy(buddy) => buddy.alloc(size),
        }
    }

    fn free(&mut self, block: Block) {
        match self {
            Self::FreeList(heap) => heap.free(block),
            Self::Buddy(buddy) => buddy.free(block),
        }
    }

    fn free_raw(&mut self, payload: Option<usize>) -> AllocResult<()> {
        match self {
            Self::FreeList(heap) => heap.free_raw(payload),
            Self::Buddy(buddy) => buddy.free_raw(payload),
        }
    }

    fn payload(&self, block: &Block) -> &[u8] {
        match self {
            Self::FreeList(heap) => heap.payload(block),
            Self::Buddy(buddy) => buddy.payload(block),
        }
    }

    fn payload_mut(&mut self, block: &Block) -> &mut [u8] {
        match self {
            Self::FreeList(heap) => heap.payload_mut(block),
            Self::Buddy(buddy) => buddy.payload_mut(block),
        }
    }

    fn stats(&self) -> &AllocatorStats {
        match self {
            Self::FreeList(heap) => heap.stats(),
            Self::Buddy(buddy) => buddy.stats(),
        }
    }

    fn free_bytes(&self) -> usize {
        match self {
            Self::FreeList(heap) => heap.free_bytes(),
            Self::Buddy(buddy) => buddy.free_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArenaConfig, StrategyKind};

    #[test]
    fn test_instance_dispatches_to_configured_strategy() {
        let mut bytes = vec![0u8; 1 << 20];

        let config = ArenaConfig::default();
        let mut heap = config.build(&mut bytes).unwrap();
        assert_eq!(heap.strategy(), Strategy::FreeList);
        let block = heap.alloc(100).unwrap();
        heap.free(block);
        assert_eq!(heap.free_bytes(), heap.managed_capacity());
        let bytes = heap.destroy();

        let mut buddy = config.with_strategy(StrategyKind::Buddy).build(bytes).unwrap();
        assert_eq!(buddy.strategy(), Strategy::Buddy);
        let block = buddy.alloc(300).unwrap();
        assert_eq!(buddy.stats().bytes_in_use, 512);
        assert_eq!(buddy.free_raw(Some(block.into_raw())), Ok(()));
        assert_eq!(buddy.free_bytes(), 1 << 20);
    }
}

//! # Arena Alloc Core
//!
//! Two allocators that manage one caller-supplied, fixed-size byte region
//! without ever calling the platform allocator:
//!
//! - **Free list**: first-fit over a singly-linked list, in-place splitting,
//!   LIFO release, no merging of neighbours.
//! - **Buddy**: one list per power-of-two order, splitting on demand,
//!   optional buddy coalescing.
//!
//! ## Architecture Rules
//!
//! 1. **Bookkeeping lives in the arena** - headers and links are written
//!    into the region being managed
//! 2. **Offsets, not pointers** - every address is an offset into the
//!    region, every access is bounds-checked
//! 3. **Tokens, not raw frees** - `alloc` returns a [`Block`] that `free`
//!    consumes; raw offsets go through `free_raw`
//!
//! ## Example
//!
//! ```rust
//! use arena_alloc_core::{ArenaAllocator, FreeListAllocator};
//!
//! let mut bytes = vec![0u8; 1016];
//! let mut heap = FreeListAllocator::create(&mut bytes).unwrap();
//!
//! let block = heap.alloc(100).unwrap();
//! heap.payload_mut(&block)[0] = 42;
//! heap.free(block);
//!
//! let bytes = heap.destroy();
//! assert_eq!(bytes.len(), 1016);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod allocators;
pub mod error;
pub mod memory;
pub mod sync;

pub use allocators::{
    AllocatorStats, ArenaAllocator, Block, BuddyAllocator, BuddyConfig, FreeBlockInfo,
    FreeListAllocator, Strategy, CONTROL_SIZE,
};
pub use error::{AllocError, AllocResult};
pub use memory::{Arena, BlockHeader, HEADER_SIZE};
pub use sync::SharedAllocator;

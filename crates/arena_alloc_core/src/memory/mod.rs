//! # Memory Layout
//!
//! The arena region, the in-place block header and the order math every
//! allocator builds on.
//!
//! ## Design Philosophy
//!
//! The arena is supplied once by the caller. After that:
//! - No heap allocations
//! - All bookkeeping is written into the arena bytes
//! - Addresses are offsets from the start of the region

mod arena;
mod header;
pub mod order;

pub use arena::Arena;
pub use header::{decode_link, encode_link, BlockHeader, HEADER_SIZE, LINK_ALLOCATED, LINK_NIL};

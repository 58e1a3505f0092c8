//! # External Serialization
//!
//! The allocators never lock. A caller that shares one allocator between
//! threads must serialize every `alloc` and `free` itself:
//!
//! ```text
//! Thread 1:  lock -> alloc(64)  -> unlock
//! Thread 2:  lock -> free(blk)  -> unlock
//! Thread 3:  lock -> alloc(300) -> unlock
//!
//! One mutex guards the whole instance: list heads, headers and links.
//! ```
//!
//! [`SharedAllocator`] is that mutex, packaged.

mod shared;

pub use shared::SharedAllocator;

//! # Allocator Error Types
//!
//! All errors that can occur while creating or driving an allocator.
//!
//! `alloc` itself reports exhaustion with `None`; these types cover
//! construction, the raw release path and the `try_alloc` convenience.

use thiserror::Error;

/// Errors that can occur in the allocator core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The supplied region cannot host the strategy's minimum bookkeeping.
    #[error("arena too small: {size} bytes supplied, at least {required} required")]
    ArenaTooSmall {
        /// Bytes supplied by the caller.
        size: usize,
        /// Minimum bytes the strategy needs.
        required: usize,
    },

    /// The configured maximum buddy order is outside the supported range.
    #[error("invalid buddy order {order}: must be within {min}..={max}")]
    InvalidOrder {
        /// Order that was requested.
        order: u32,
        /// Smallest supported order.
        min: u32,
        /// Largest supported order.
        max: u32,
    },

    /// A zero-byte allocation was requested.
    #[error("zero-sized allocation requested")]
    ZeroSize,

    /// No free block can satisfy the request.
    #[error("out of memory: no free block fits {requested} bytes")]
    OutOfMemory {
        /// Payload bytes that were requested.
        requested: usize,
    },

    /// A raw payload offset does not point inside the managed region.
    #[error("invalid payload offset {0}")]
    InvalidOffset(usize),

    /// A raw payload offset does not name a live allocation.
    #[error("offset {0} is not a live allocation")]
    NotAllocated(usize),
}

/// Result type for allocator operations.
pub type AllocResult<T> = Result<T, AllocError>;

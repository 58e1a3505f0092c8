//! # Shared Allocator
//!
//! A single `parking_lot::Mutex` around any [`ArenaAllocator`].

use parking_lot::Mutex;

use crate::allocators::{AllocatorStats, ArenaAllocator, Block};

/// An allocator shared between threads through one lock.
///
/// Every call takes the lock for its full duration, so calls from
/// different threads never interleave inside a list walk or a split.
///
/// # Example
///
/// ```rust
/// use arena_alloc_core::{FreeListAllocator, SharedAllocator};
///
/// let mut bytes = vec![0u8; 4096];
/// let shared = SharedAllocator::new(FreeListAllocator::create(&mut bytes).unwrap());
///
/// std::thread::scope(|scope| {
///     for _ in 0..4 {
///         scope.spawn(|| {
///             if let Some(block) = shared.alloc(32) {
///                 shared.free(block);
///             }
///         });
///     }
/// });
/// ```
#[derive(Debug)]
pub struct SharedAllocator<A> {
    /// The guarded allocator.
    inner: Mutex<A>,
}

impl<A: ArenaAllocator> SharedAllocator<A> {
    /// Wraps an allocator.
    #[must_use]
    pub fn new(allocator: A) -> Self {
        Self {
            inner: Mutex::new(allocator),
        }
    }

    /// Allocates under the lock.
    #[must_use]
    pub fn alloc(&self, size: usize) -> Option<Block> {
        self.inner.lock().alloc(size)
    }

    /// Frees under the lock.
    pub fn free(&self, block: Block) {
        self.inner.lock().free(block);
    }

    /// Runs `f` with exclusive access, e.g. to touch a payload.
    pub fn with<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Snapshot of the allocation counters.
    #[must_use]
    pub fn stats(&self) -> AllocatorStats {
        *self.inner.lock().stats()
    }

    /// Unwraps the allocator.
    #[must_use]
    pub fn into_inner(self) -> A {
        self.inner.into_inner()
    }
}

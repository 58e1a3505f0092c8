//! # Order Math
//!
//! Power-of-two size classes shared by the buddy allocator and its tests.
//!
//! An order `k` names a block of exactly `2^k` bytes, header included.

use super::header::HEADER_SIZE;

/// Default largest buddy order (1 MiB blocks).
pub const DEFAULT_MAX_ORDER: u32 = 20;

/// Smallest order whose block can host a header and one payload byte.
pub const MIN_ORDER: u32 = ceil_log2(HEADER_SIZE + 1);

/// Largest order the buddy allocator accepts.
pub const MAX_SUPPORTED_ORDER: u32 = 40;

/// Number of per-order list slots a buddy allocator carries.
pub const ORDER_SLOTS: usize = MAX_SUPPORTED_ORDER as usize + 1;

/// `floor(log2(n))` for `n >= 1`.
///
/// # Panics
///
/// Panics if `n == 0`.
#[inline]
#[must_use]
pub const fn floor_log2(n: usize) -> u32 {
    assert!(n > 0, "log2 of zero");
    usize::BITS - 1 - n.leading_zeros()
}

/// `ceil(log2(n))` for `n >= 1`.
///
/// # Panics
///
/// Panics if `n == 0`.
#[inline]
#[must_use]
pub const fn ceil_log2(n: usize) -> u32 {
    let floor = floor_log2(n);
    if n.is_power_of_two() {
        floor
    } else {
        floor + 1
    }
}

/// Size in bytes of a block of the given order.
#[inline]
#[must_use]
pub const fn block_size(order: u32) -> usize {
    1usize << order
}

/// Order of the smallest block that holds `requested` payload bytes plus
/// one header.
///
/// Returns `None` for a zero request or when the sum overflows.
#[inline]
#[must_use]
pub const fn order_for_request(requested: usize) -> Option<u32> {
    if requested == 0 {
        return None;
    }
    match requested.checked_add(HEADER_SIZE) {
        Some(total) => Some(ceil_log2(total)),
        None => None,
    }
}

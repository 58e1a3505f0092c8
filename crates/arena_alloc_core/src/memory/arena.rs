//! # Arena Region
//!
//! The caller-owned byte region every allocator manages.

use std::fmt;

use bytemuck::Pod;

use super::header::{BlockHeader, HEADER_SIZE};

/// A borrowed, fixed-size byte region with offset-based addressing.
///
/// The arena is owned by whoever created the bytes. Allocators borrow it
/// for their whole lifetime and give the borrow back on `destroy`, so the
/// region always outlives the handle that manages it.
///
/// All reads and writes are bounds-checked slice accesses. Values are copied
/// in and out with `bytemuck`, so offsets need no particular alignment.
///
/// # Thread Safety
///
/// An arena is NOT synchronized. Exclusive access comes from the `&mut`
/// borrow it wraps.
pub struct Arena<'a> {
    /// The backing bytes.
    bytes: &'a mut [u8],
}

impl<'a> Arena<'a> {
    /// Wraps a caller-supplied region.
    #[inline]
    #[must_use]
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if a whole header fits at `offset`.
    #[inline]
    #[must_use]
    pub fn fits_header(&self, offset: usize) -> bool {
        offset
            .checked_add(HEADER_SIZE)
            .is_some_and(|end| end <= self.bytes.len())
    }

    /// Copies a `Pod` value out of the arena.
    ///
    /// # Panics
    ///
    /// Panics if the value does not fit at `offset`.
    #[inline]
    #[must_use]
    pub fn read<T: Pod>(&self, offset: usize) -> T {
        bytemuck::pod_read_unaligned(&self.bytes[offset..offset + std::mem::size_of::<T>()])
    }

    /// Copies a `Pod` value into the arena.
    ///
    /// # Panics
    ///
    /// Panics if the value does not fit at `offset`.
    #[inline]
    pub fn write<T: Pod>(&mut self, offset: usize, value: &T) {
        self.bytes[offset..offset + std::mem::size_of::<T>()]
            .copy_from_slice(bytemuck::bytes_of(value));
    }

    /// Reads the block header stored at `offset`.
    #[inline]
    #[must_use]
    pub fn header(&self, offset: usize) -> BlockHeader {
        self.read(offset)
    }

    /// Writes a block header at `offset`.
    #[inline]
    pub fn set_header(&mut self, offset: usize, header: BlockHeader) {
        self.write(offset, &header);
    }

    /// Returns `len` bytes starting at `offset`.
    #[inline]
    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    /// Returns `len` mutable bytes starting at `offset`.
    #[inline]
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.bytes[offset..offset + len]
    }

    /// Gives the region back to its owner.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> &'a mut [u8] {
        self.bytes
    }
}

impl fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip_at_unaligned_offset() {
        let mut bytes = [0u8; 64];
        let mut arena = Arena::new(&mut bytes);

        let header = BlockHeader::free(40, Some(7));
        arena.set_header(3, header);
        assert_eq!(arena.header(3), header);
    }

    #[test]
    fn test_fits_header_at_the_edge() {
        let mut bytes = [0u8; 32];
        let arena = Arena::new(&mut bytes);

        assert!(arena.fits_header(16));
        assert!(!arena.fits_header(17));
        assert!(!arena.fits_header(usize::MAX));
    }

    #[test]
    fn test_into_inner_keeps_bytes() {
        let mut bytes = [0u8; 32];
        let mut arena = Arena::new(&mut bytes);
        arena.slice_mut(0, 4).copy_from_slice(&[1, 2, 3, 4]);

        let bytes = arena.into_inner();
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
    }
}

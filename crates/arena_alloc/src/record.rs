//! # Demo Record
//!
//! The fixed-size object the demo harness stores in each allocation.

use bytemuck::{Pod, Zeroable};

/// Bytes reserved for a record name, NUL terminator included.
pub const NAME_CAPACITY: usize = 48;

/// Size of an encoded record.
pub const RECORD_SIZE: usize = std::mem::size_of::<Record>();

/// A small `Pod` record: id, value and a NUL-terminated name.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Record {
    /// Record id.
    pub id: i32,
    /// Payload value.
    pub value: f32,
    /// NUL-terminated UTF-8 name.
    pub name: [u8; NAME_CAPACITY],
}

impl Record {
    /// Creates a record, truncating `name` to fit with its terminator.
    #[must_use]
    pub fn new(id: i32, name: &str, value: f32) -> Self {
        let mut record = Self::zeroed();
        record.id = id;
        record.value = value;

        let mut len = name.len().min(NAME_CAPACITY - 1);
        while !name.is_char_boundary(len) {
            len -= 1;
        }
        record.name[..len].copy_from_slice(&name.as_bytes()[..len]);
        record
    }

    /// The name up to its terminator.
    #[must_use]
    pub fn name(&self) -> &str {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_CAPACITY);
        std::str::from_utf8(&self.name[..end]).unwrap_or_default()
    }

    /// Copies the record into the front of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`RECORD_SIZE`].
    pub fn write_to(&self, bytes: &mut [u8]) {
        bytes[..RECORD_SIZE].copy_from_slice(bytemuck::bytes_of(self));
    }

    /// Reads a record from the front of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`RECORD_SIZE`].
    #[must_use]
    pub fn read_from(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..RECORD_SIZE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout_has_no_padding() {
        assert_eq!(RECORD_SIZE, 4 + 4 + NAME_CAPACITY);
    }

    #[test]
    fn test_name_truncates_on_char_boundary() {
        let long = "я".repeat(40); // 80 bytes
        let record = Record::new(1, &long, 0.5);
        assert_eq!(record.name().len(), 46);
        assert!(record.name().chars().all(|c| c == 'я'));
    }

    #[test]
    fn test_write_then_read_through_unaligned_slice() {
        let record = Record::new(7, "Object 7", 135.79);
        let mut bytes = [0u8; RECORD_SIZE + 3];
        record.write_to(&mut bytes[3..]);
        assert_eq!(Record::read_from(&bytes[3..]), record);
        assert_eq!(Record::read_from(&bytes[3..]).name(), "Object 7");
    }
}

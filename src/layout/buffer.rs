//! Growable byte buffer used by every `encode_to_vec` path.
//!
//! The backing storage doubles its capacity whenever a write does not fit and
//! copies the existing bytes over, so a sequence of `n` appends costs `O(n)`
//! amortized. Writers return the new logical length.

use super::shortvec;
use crate::error::LayoutError;

const INITIAL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    storage: Vec<u8>,
    len: usize,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            storage: vec![0; capacity],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size of the backing storage.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    pub fn into_vec(mut self) -> Vec<u8> {
        self.storage.truncate(self.len);
        self.storage
    }

    /// Drop everything past `len`. Capacity is kept.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
        }
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.len + additional;
        if needed <= self.storage.len() {
            return;
        }
        let mut capacity = self.storage.len().max(1);
        while capacity < needed {
            capacity *= 2;
        }
        let mut grown = vec![0; capacity];
        grown[..self.len].copy_from_slice(&self.storage[..self.len]);
        self.storage = grown;
    }

    /// Make sure `additional` zeroed bytes are writable past the current end
    /// and hand them out for in-place encoding.
    pub fn extend_zeroed(&mut self, additional: usize) -> &mut [u8] {
        self.reserve(additional);
        let start = self.len;
        self.len += additional;
        let window = &mut self.storage[start..self.len];
        window.fill(0);
        window
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        self.extend_zeroed(bytes.len()).copy_from_slice(bytes);
        self.len
    }

    pub fn write_u8(&mut self, value: u8) -> usize {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> usize {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> usize {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> usize {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_compact_u16(&mut self, value: usize) -> Result<usize, LayoutError> {
        let encoded = shortvec::encode_length(value)?;
        Ok(self.write_bytes(&encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_return_new_length() {
        let mut buf = ByteBuffer::new();
        assert_eq!(buf.write_u8(1), 1);
        assert_eq!(buf.write_u32(2), 5);
        assert_eq!(buf.write_u64(3), 13);
        assert_eq!(buf.write_u16(0xabcd), 15);
        assert_eq!(
            buf.as_slice(),
            &[1, 2, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0xcd, 0xab]
        );
    }

    #[test]
    fn test_capacity_doubles() {
        let mut buf = ByteBuffer::with_capacity(4);
        buf.write_bytes(&[0; 4]);
        assert_eq!(buf.capacity(), 4);
        buf.write_u8(9);
        assert_eq!(buf.capacity(), 8);
        buf.write_bytes(&[7; 20]);
        assert_eq!(buf.capacity(), 32);
        let bytes = buf.into_vec();
        assert_eq!(bytes.len(), 25);
        assert_eq!(bytes[4], 9);
        assert_eq!(bytes[24], 7);
    }

    #[test]
    fn test_zero_capacity_grows() {
        let mut buf = ByteBuffer::with_capacity(0);
        assert!(buf.is_empty());
        buf.write_u16(1);
        assert_eq!(buf.len(), 2);
        assert!(buf.capacity() >= 2);
    }

    #[test]
    fn test_write_compact_u16() {
        let mut buf = ByteBuffer::new();
        assert_eq!(buf.write_compact_u16(128).unwrap(), 2);
        assert_eq!(buf.as_slice(), &[0x80, 0x01]);
        assert!(buf.write_compact_u16(0x1_0000).is_err());
    }
}

//! Compact-u16 length encoding ("short vec").
//!
//! Every variable-length array on the wire is prefixed with its element count
//! in this format: 7 bits per byte, least significant group first, high bit
//! set on every byte except the last. Counts are limited to `u16`, so an
//! encoding is at most 3 bytes.

use crate::error::LayoutError;

pub const MAX_ENCODING_LENGTH: usize = 3;

/// Number of bytes `len` occupies once encoded.
pub fn encoded_length_size(len: usize) -> usize {
    match len {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        _ => 3,
    }
}

pub fn encode_length(len: usize) -> Result<Vec<u8>, LayoutError> {
    if len > u16::MAX as usize {
        return Err(LayoutError::schema(format!(
            "compact-u16 length {} exceeds {}",
            len,
            u16::MAX
        )));
    }
    let mut rem_len = len;
    let mut out = Vec::with_capacity(MAX_ENCODING_LENGTH);
    loop {
        let mut elem = (rem_len & 0x7f) as u8;
        rem_len >>= 7;
        if rem_len == 0 {
            out.push(elem);
            break;
        }
        elem |= 0x80;
        out.push(elem);
    }
    Ok(out)
}

/// Decode a compact-u16 at `offset`, returning `(value, bytes consumed)`.
pub fn decode_length(bytes: &[u8], offset: usize) -> Result<(usize, usize), LayoutError> {
    let mut value: usize = 0;
    for size in 0..MAX_ENCODING_LENGTH {
        let Some(&elem) = bytes.get(offset + size) else {
            return Err(LayoutError::out_of_bounds(
                offset,
                size + 1,
                bytes.len().saturating_sub(offset),
            ));
        };
        let group = (elem & 0x7f) as usize;
        // A trailing zero group means the same value has a shorter encoding.
        if group == 0 && size > 0 && elem & 0x80 == 0 {
            return Err(LayoutError::schema("non-canonical compact-u16 encoding"));
        }
        value |= group << (size * 7);
        if value > u16::MAX as usize {
            return Err(LayoutError::schema("compact-u16 value overflows u16"));
        }
        if elem & 0x80 == 0 {
            return Ok((value, size + 1));
        }
    }
    Err(LayoutError::schema(
        "compact-u16 encoding longer than 3 bytes",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_sizes() {
        for (len, expected) in [
            (0usize, vec![0x00]),
            (1, vec![0x01]),
            (0x7f, vec![0x7f]),
            (0x80, vec![0x80, 0x01]),
            (0xff, vec![0xff, 0x01]),
            (0x100, vec![0x80, 0x02]),
            (0x3fff, vec![0xff, 0x7f]),
            (0x4000, vec![0x80, 0x80, 0x01]),
            (0xffff, vec![0xff, 0xff, 0x03]),
        ] {
            let encoded = encode_length(len).unwrap();
            assert_eq!(encoded, expected, "encoding {}", len);
            assert_eq!(encoded_length_size(len), expected.len());
            assert_eq!(decode_length(&encoded, 0).unwrap(), (len, expected.len()));
        }
    }

    #[test]
    fn test_decode_at_offset() {
        let bytes = [9, 9, 0xac, 0x02, 9];
        assert_eq!(decode_length(&bytes, 2).unwrap(), (300, 2));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(encode_length(0x1_0000).is_err());
        // 0x10000 spelled out in three bytes
        assert!(decode_length(&[0x80, 0x80, 0x04], 0).is_err());
    }

    #[test]
    fn test_rejects_alias_encoding() {
        assert!(decode_length(&[0x80, 0x00], 0).is_err());
        assert!(decode_length(&[0x81, 0x80, 0x00], 0).is_err());
    }

    #[test]
    fn test_rejects_truncated() {
        assert!(matches!(
            decode_length(&[0x80], 0),
            Err(LayoutError::OutOfBounds { .. })
        ));
        assert!(matches!(
            decode_length(&[], 0),
            Err(LayoutError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_four_byte_encoding() {
        assert!(decode_length(&[0x80, 0x80, 0x80, 0x00], 0).is_err());
    }
}

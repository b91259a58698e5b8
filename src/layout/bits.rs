//! Bit fields packed into a single 1 to 4 byte word.

use super::{Fields, IntLayout, Value};
use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitKind {
    Bool,
    UInt,
}

#[derive(Debug, Clone)]
pub struct BitField {
    pub name: String,
    pub bits: u32,
    pub kind: BitKind,
    /// Shift of the field's least significant bit within the word.
    start: u32,
}

impl BitField {
    fn mask(&self) -> u64 {
        (1u64 << self.bits) - 1
    }
}

#[derive(Debug, Clone)]
pub struct BitStructure {
    word: IntLayout,
    msb_first: bool,
    fields: Vec<BitField>,
    used_bits: u32,
}

impl BitStructure {
    /// `msb_first` allocates fields from the most significant bit down.
    pub fn new(word: IntLayout, msb_first: bool) -> Result<Self, LayoutError> {
        if word.is_signed() || word.width() == 0 || word.width() > 4 {
            return Err(LayoutError::schema(
                "bit structures need an unsigned word of 1 to 4 bytes",
            ));
        }
        Ok(BitStructure {
            word,
            msb_first,
            fields: Vec::new(),
            used_bits: 0,
        })
    }

    fn word_bits(&self) -> u32 {
        8 * self.word.width() as u32
    }

    fn push(mut self, name: &str, bits: u32, kind: BitKind) -> Result<Self, LayoutError> {
        if bits == 0 || self.used_bits + bits > self.word_bits() {
            return Err(LayoutError::schema(format!(
                "{} bits do not fit: {} of {} already used",
                bits,
                self.used_bits,
                self.word_bits()
            ))
            .within(name));
        }
        let start = if self.msb_first {
            self.word_bits() - self.used_bits - bits
        } else {
            self.used_bits
        };
        self.used_bits += bits;
        self.fields.push(BitField {
            name: name.to_string(),
            bits,
            kind,
            start,
        });
        Ok(self)
    }

    pub fn add_field(self, name: &str, bits: u32) -> Result<Self, LayoutError> {
        self.push(name, bits, BitKind::UInt)
    }

    pub fn add_boolean(self, name: &str) -> Result<Self, LayoutError> {
        self.push(name, 1, BitKind::Bool)
    }

    pub fn fields(&self) -> &[BitField] {
        &self.fields
    }

    pub(super) fn span(&self) -> usize {
        self.word.width()
    }

    pub(super) fn decode_in(&self, bytes: &[u8], offset: usize) -> Result<(Value, usize), LayoutError> {
        let word = self.word.read_raw(bytes, offset)?;
        let mut decoded = Fields::new();
        for field in &self.fields {
            let raw = (word >> field.start) & field.mask();
            let value = match field.kind {
                BitKind::Bool => Value::Bool(raw != 0),
                BitKind::UInt => Value::UInt(raw),
            };
            decoded.insert(&field.name, value);
        }
        Ok((Value::Struct(decoded), self.span()))
    }

    /// Pack `value` into a word. Absent members are zero.
    pub(super) fn to_word(&self, value: &Value) -> Result<u64, LayoutError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let mut word = 0u64;
        for field in &self.fields {
            let raw = match (field.kind, fields.get(&field.name)) {
                (_, None) => 0,
                (BitKind::Bool, Some(v)) => v
                    .as_bool()
                    .map(u64::from)
                    .ok_or_else(|| v.mismatch("boolean").within(field.name.as_str()))?,
                (BitKind::UInt, Some(v)) => v
                    .as_u64()
                    .ok_or_else(|| v.mismatch("unsigned integer").within(field.name.as_str()))?,
            };
            if raw > field.mask() {
                return Err(LayoutError::schema(format!(
                    "value {} does not fit in {} bits",
                    raw, field.bits
                ))
                .within(field.name.as_str()));
            }
            word |= raw << field.start;
        }
        Ok(word)
    }

    pub(super) fn encode_in(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize, LayoutError> {
        let word = self.to_word(value)?;
        self.word.write_raw(word, buf, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Layout;
    use super::*;

    #[test]
    fn test_lsb_first_packing() {
        let bits = BitStructure::new(IntLayout::U8, false)
            .unwrap()
            .add_field("low", 3)
            .unwrap()
            .add_boolean("flag")
            .unwrap()
            .add_field("high", 4)
            .unwrap();
        let layout = Layout::Bits(bits);
        let value = Value::Struct(
            Fields::new()
                .with("low", 5u8)
                .with("flag", Value::Bool(true))
                .with("high", 0xau8),
        );
        let bytes = layout.encode_to_vec(&value).unwrap();
        assert_eq!(bytes, vec![0b1010_1101]);
        assert_eq!(layout.decode(&bytes, 0).unwrap(), value);
    }

    #[test]
    fn test_msb_first_packing() {
        let bits = BitStructure::new(IntLayout::U16, true)
            .unwrap()
            .add_boolean("signed")
            .unwrap()
            .add_field("index", 7)
            .unwrap();
        let layout = Layout::Bits(bits);
        let value = Value::Struct(
            Fields::new()
                .with("signed", Value::Bool(true))
                .with("index", 3u8),
        );
        // 1000_0011 0000_0000, little-endian word
        assert_eq!(layout.encode_to_vec(&value).unwrap(), vec![0x00, 0x83]);
    }

    #[test]
    fn test_value_wider_than_field() {
        let bits = BitStructure::new(IntLayout::U8, false)
            .unwrap()
            .add_field("nibble", 4)
            .unwrap();
        let err = Layout::Bits(bits)
            .encode_to_vec(&Value::Struct(Fields::new().with("nibble", 16u8)))
            .unwrap_err();
        assert_eq!(err.path().to_string(), "nibble");
    }

    #[test]
    fn test_fields_must_fit_word() {
        let bits = BitStructure::new(IntLayout::U8, false)
            .unwrap()
            .add_field("a", 6)
            .unwrap();
        assert!(bits.add_field("b", 3).is_err());
        assert!(BitStructure::new(IntLayout::U64, false).is_err());
    }
}

//! Schema-driven binary layouts.
//!
//! A [`Layout`] describes how a [`Value`] maps onto bytes. Layouts compose:
//! structures hold named fields, sequences repeat an element and unions pick a
//! payload by discriminant. Every wire format in this crate (messages,
//! transactions, lookup tables, program instructions) is a `Layout` tree run
//! through the functions in this module.
//!
//! Spans are either fixed ([`Layout::span`] returns `Some`) or depend on the
//! bytes being decoded / the value being encoded. Errors carry the path of the
//! field that failed, e.g. `instructions[0].data`.

mod bits;
mod buffer;
pub mod shortvec;
mod union;
mod value;

pub use bits::{BitField, BitKind, BitStructure};
pub use buffer::ByteBuffer;
pub use union::{Union, VariantLayout};
pub use value::{Fields, Value, VariantValue};

use crate::error::LayoutError;
use solana_pubkey::Pubkey;

const PUBKEY_BYTES: usize = 32;
const PADDING: &str = "<padding>";

pub(crate) fn ensure(len: usize, offset: usize, needed: usize) -> Result<(), LayoutError> {
    let available = len.saturating_sub(offset);
    if available < needed {
        return Err(LayoutError::out_of_bounds(offset, needed, available));
    }
    Ok(())
}

fn write_slice(buf: &mut [u8], offset: usize, data: &[u8]) -> Result<usize, LayoutError> {
    ensure(buf.len(), offset, data.len())?;
    buf[offset..offset + data.len()].copy_from_slice(data);
    Ok(data.len())
}

fn to_count(value: u64) -> Result<usize, LayoutError> {
    usize::try_from(value).map_err(|_| LayoutError::schema(format!("length {} too large", value)))
}

/// u64 length prefix plus `len` bytes of text. May not fit a 32-bit usize.
fn string_span(len: usize) -> Result<usize, LayoutError> {
    len.checked_add(8)
        .ok_or_else(|| LayoutError::schema(format!("string length {} too large", len)))
}

// ===== Integers =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Fixed-width integer, 1 to 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLayout {
    width: usize,
    signed: bool,
    endian: Endian,
}

impl IntLayout {
    pub const U8: IntLayout = IntLayout::unsigned(1);
    pub const U16: IntLayout = IntLayout::unsigned(2);
    pub const U32: IntLayout = IntLayout::unsigned(4);
    pub const U64: IntLayout = IntLayout::unsigned(8);
    pub const I32: IntLayout = IntLayout::signed(4);
    pub const I64: IntLayout = IntLayout::signed(8);

    pub const fn unsigned(width: usize) -> Self {
        IntLayout {
            width,
            signed: false,
            endian: Endian::Little,
        }
    }

    pub const fn signed(width: usize) -> Self {
        IntLayout {
            width,
            signed: true,
            endian: Endian::Little,
        }
    }

    pub const fn big_endian(self) -> Self {
        IntLayout {
            width: self.width,
            signed: self.signed,
            endian: Endian::Big,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    fn check_width(&self) -> Result<(), LayoutError> {
        if self.width == 0 || self.width > 8 {
            return Err(LayoutError::schema(format!(
                "integer width must be 1..=8 bytes, got {}",
                self.width
            )));
        }
        Ok(())
    }

    pub(crate) fn read_raw(&self, bytes: &[u8], offset: usize) -> Result<u64, LayoutError> {
        self.check_width()?;
        ensure(bytes.len(), offset, self.width)?;
        let window = &bytes[offset..offset + self.width];
        let mut raw = 0u64;
        match self.endian {
            Endian::Little => {
                for (i, b) in window.iter().enumerate() {
                    raw |= (*b as u64) << (8 * i);
                }
            }
            Endian::Big => {
                for b in window {
                    raw = (raw << 8) | *b as u64;
                }
            }
        }
        Ok(raw)
    }

    pub(crate) fn write_raw(&self, raw: u64, buf: &mut [u8], offset: usize) -> Result<usize, LayoutError> {
        self.check_width()?;
        ensure(buf.len(), offset, self.width)?;
        for i in 0..self.width {
            let byte = (raw >> (8 * i)) as u8;
            match self.endian {
                Endian::Little => buf[offset + i] = byte,
                Endian::Big => buf[offset + self.width - 1 - i] = byte,
            }
        }
        Ok(self.width)
    }

    /// Range-check `value` for this width and return its two's complement bits.
    pub(crate) fn to_raw(&self, value: &Value) -> Result<u64, LayoutError> {
        self.check_width()?;
        let v: i128 = match value {
            Value::UInt(v) => *v as i128,
            Value::Int(v) => *v as i128,
            other => return Err(other.mismatch("integer")),
        };
        let bits = 8 * self.width as u32;
        let (min, max) = if self.signed {
            let half = 1i128 << (bits - 1);
            (-half, half - 1)
        } else {
            (0, (1i128 << bits) - 1)
        };
        if v < min || v > max {
            return Err(LayoutError::schema(format!(
                "value {} out of range for {}-byte {} integer",
                v,
                self.width,
                if self.signed { "signed" } else { "unsigned" }
            )));
        }
        Ok(v as u64)
    }

    pub(crate) fn from_raw(&self, raw: u64) -> Value {
        if self.signed {
            let shift = 64 - 8 * self.width as u32;
            Value::Int(((raw << shift) as i64) >> shift)
        } else {
            Value::UInt(raw)
        }
    }

    pub fn decode(&self, bytes: &[u8], offset: usize) -> Result<Value, LayoutError> {
        Ok(self.from_raw(self.read_raw(bytes, offset)?))
    }

    pub fn encode(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize, LayoutError> {
        let raw = self.to_raw(value)?;
        self.write_raw(raw, buf, offset)
    }
}

// ===== Lengths =====

/// Where the element count of a blob or sequence comes from.
#[derive(Debug, Clone)]
pub enum Length {
    Fixed(usize),
    /// Count encoded right before the elements (integer or compact-u16 layout).
    Prefixed(Box<Layout>),
    /// Count taken from an earlier named field of the enclosing structure.
    Field(String),
    /// Everything up to the end of the buffer.
    Remaining,
}

impl Length {
    pub fn compact() -> Self {
        Length::Prefixed(Box::new(Layout::CompactU16))
    }

    pub fn field(name: &str) -> Self {
        Length::Field(name.to_string())
    }

    fn sibling(ctx: Option<&Fields>, name: &str) -> Result<usize, LayoutError> {
        let value = ctx.and_then(|fields| fields.get(name)).ok_or_else(|| {
            LayoutError::schema(format!("length field `{}` is not available", name))
        })?;
        let count = value
            .as_u64()
            .ok_or_else(|| value.mismatch("unsigned length").within(name))?;
        to_count(count)
    }

    /// Resolve the count while decoding, returning `(count, header bytes)`.
    fn decode_count(
        &self,
        bytes: &[u8],
        offset: usize,
        ctx: Option<&Fields>,
        unit: Option<usize>,
    ) -> Result<(usize, usize), LayoutError> {
        match self {
            Length::Fixed(n) => Ok((*n, 0)),
            Length::Prefixed(prefix) => {
                let (value, size) = prefix
                    .decode_in(bytes, offset, None)
                    .map_err(|e| e.within("length"))?;
                let count = value
                    .as_u64()
                    .ok_or_else(|| value.mismatch("unsigned length").within("length"))?;
                Ok((to_count(count)?, size))
            }
            Length::Field(name) => Ok((Self::sibling(ctx, name)?, 0)),
            Length::Remaining => {
                let remaining = bytes.len().saturating_sub(offset);
                match unit {
                    Some(unit) if unit > 0 => {
                        if remaining % unit != 0 {
                            return Err(LayoutError::schema(format!(
                                "{} remaining bytes is not a multiple of the {}-byte element",
                                remaining, unit
                            )));
                        }
                        Ok((remaining / unit, 0))
                    }
                    _ => Err(LayoutError::schema(
                        "a remaining-length sequence needs a fixed-size element",
                    )),
                }
            }
        }
    }

    /// Validate `count` against the declared length and return the header size.
    fn header_len(&self, count: usize, ctx: Option<&Fields>) -> Result<usize, LayoutError> {
        match self {
            Length::Fixed(n) => {
                if *n != count {
                    return Err(LayoutError::schema(format!(
                        "expected {} elements, got {}",
                        n, count
                    )));
                }
                Ok(0)
            }
            Length::Prefixed(prefix) => prefix
                .encoded_len_in(&Value::UInt(count as u64), None)
                .map_err(|e| e.within("length")),
            Length::Field(name) => {
                let declared = Self::sibling(ctx, name)?;
                if declared != count {
                    return Err(LayoutError::schema(format!(
                        "length field `{}` is {} but {} elements are present",
                        name, declared, count
                    )));
                }
                Ok(0)
            }
            Length::Remaining => Ok(0),
        }
    }

    fn encode_count(
        &self,
        count: usize,
        buf: &mut [u8],
        offset: usize,
        ctx: Option<&Fields>,
    ) -> Result<usize, LayoutError> {
        match self {
            Length::Prefixed(prefix) => prefix
                .encode_in(&Value::UInt(count as u64), buf, offset, None)
                .map_err(|e| e.within("length")),
            _ => self.header_len(count, ctx),
        }
    }
}

// ===== Composites =====

#[derive(Debug, Clone)]
pub struct Field {
    name: Option<String>,
    layout: Layout,
}

impl Field {
    pub fn new(name: &str, layout: Layout) -> Self {
        Field {
            name: Some(name.to_string()),
            layout,
        }
    }

    /// An anonymous field: encoded as zeros, dropped on decode.
    pub fn padding(layout: Layout) -> Self {
        Field { name: None, layout }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(PADDING)
    }
}

#[derive(Debug, Clone)]
pub struct Structure {
    fields: Vec<Field>,
}

impl Structure {
    pub fn new(fields: Vec<Field>) -> Self {
        Structure { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn span(&self) -> Option<usize> {
        self.fields.iter().map(|f| f.layout.span()).sum()
    }

    fn decode_in(&self, bytes: &[u8], offset: usize) -> Result<(Value, usize), LayoutError> {
        let mut decoded = Fields::new();
        let mut pos = 0;
        for field in &self.fields {
            let (value, used) = field
                .layout
                .decode_in(bytes, offset + pos, Some(&decoded))
                .map_err(|e| e.within(field.label()))?;
            if let Some(name) = &field.name {
                decoded.insert(name, value);
            }
            pos += used;
        }
        Ok((Value::Struct(decoded), pos))
    }

    fn padding_span(field: &Field) -> Result<usize, LayoutError> {
        field
            .layout
            .span()
            .ok_or_else(|| LayoutError::schema("padding must have a fixed size").within(PADDING))
    }

    fn member<'a>(fields: &'a Fields, name: &str) -> Result<&'a Value, LayoutError> {
        fields
            .get(name)
            .ok_or_else(|| LayoutError::schema("missing field").within(name))
    }

    fn encoded_len_in(&self, value: &Value) -> Result<usize, LayoutError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let mut total = 0;
        for field in &self.fields {
            total += match &field.name {
                Some(name) => field
                    .layout
                    .encoded_len_in(Self::member(fields, name)?, Some(fields))
                    .map_err(|e| e.within(name.as_str()))?,
                None => Self::padding_span(field)?,
            };
        }
        Ok(total)
    }

    fn encode_in(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize, LayoutError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let mut pos = 0;
        for field in &self.fields {
            pos += match &field.name {
                Some(name) => field
                    .layout
                    .encode_in(Self::member(fields, name)?, buf, offset + pos, Some(fields))
                    .map_err(|e| e.within(name.as_str()))?,
                None => {
                    let span = Self::padding_span(field)?;
                    ensure(buf.len(), offset + pos, span).map_err(|e| e.within(PADDING))?;
                    buf[offset + pos..offset + pos + span].fill(0);
                    span
                }
            };
        }
        Ok(pos)
    }
}

#[derive(Debug, Clone)]
pub struct Sequence {
    element: Box<Layout>,
    count: Length,
}

impl Sequence {
    pub fn new(element: Layout, count: Length) -> Self {
        Sequence {
            element: Box::new(element),
            count,
        }
    }

    pub fn element(&self) -> &Layout {
        &self.element
    }

    fn span(&self) -> Option<usize> {
        match &self.count {
            Length::Fixed(n) => self.element.span().map(|span| span * n),
            _ => None,
        }
    }

    fn decode_in(
        &self,
        bytes: &[u8],
        offset: usize,
        ctx: Option<&Fields>,
    ) -> Result<(Value, usize), LayoutError> {
        let element_span = self.element.span();
        let (count, header) = self.count.decode_count(bytes, offset, ctx, element_span)?;
        // Fail before allocating when a corrupt count cannot possibly fit.
        if let Some(span) = element_span {
            let total = count
                .checked_mul(span)
                .ok_or_else(|| LayoutError::schema(format!("sequence of {} elements too large", count)))?;
            ensure(bytes.len(), offset + header, total)?;
        }
        let mut items = Vec::new();
        let mut pos = header;
        for i in 0..count {
            let (item, used) = self
                .element
                .decode_in(bytes, offset + pos, None)
                .map_err(|e| e.within(format!("[{}]", i)))?;
            items.push(item);
            pos += used;
        }
        Ok((Value::Seq(items), pos))
    }

    fn encoded_len_in(&self, value: &Value, ctx: Option<&Fields>) -> Result<usize, LayoutError> {
        let items = value.as_seq().ok_or_else(|| value.mismatch("sequence"))?;
        let mut total = self.count.header_len(items.len(), ctx)?;
        for (i, item) in items.iter().enumerate() {
            total += self
                .element
                .encoded_len_in(item, None)
                .map_err(|e| e.within(format!("[{}]", i)))?;
        }
        Ok(total)
    }

    fn encode_in(
        &self,
        value: &Value,
        buf: &mut [u8],
        offset: usize,
        ctx: Option<&Fields>,
    ) -> Result<usize, LayoutError> {
        let items = value.as_seq().ok_or_else(|| value.mismatch("sequence"))?;
        let mut pos = self.count.encode_count(items.len(), buf, offset, ctx)?;
        for (i, item) in items.iter().enumerate() {
            pos += self
                .element
                .encode_in(item, buf, offset + pos, None)
                .map_err(|e| e.within(format!("[{}]", i)))?;
        }
        Ok(pos)
    }
}

// ===== Layout =====

#[derive(Debug, Clone)]
pub enum Layout {
    Int(IntLayout),
    /// Solana short-vec encoded `u16`.
    CompactU16,
    PublicKey,
    Blob(Length),
    /// bincode `String`: u32 length, u32 zero padding, UTF-8 bytes.
    RustString,
    Sequence(Sequence),
    Structure(Structure),
    Union(Union),
    Bits(BitStructure),
}

impl Layout {
    pub fn u8() -> Self {
        Layout::Int(IntLayout::U8)
    }

    pub fn u16() -> Self {
        Layout::Int(IntLayout::U16)
    }

    pub fn u32() -> Self {
        Layout::Int(IntLayout::U32)
    }

    pub fn u64() -> Self {
        Layout::Int(IntLayout::U64)
    }

    pub fn i64() -> Self {
        Layout::Int(IntLayout::I64)
    }

    pub fn public_key() -> Self {
        Layout::PublicKey
    }

    pub fn blob(len: usize) -> Self {
        Layout::Blob(Length::Fixed(len))
    }

    /// Bytes prefixed with their compact-u16 length.
    pub fn compact_bytes() -> Self {
        Layout::Blob(Length::compact())
    }

    pub fn rust_string() -> Self {
        Layout::RustString
    }

    /// Elements prefixed with their compact-u16 count.
    pub fn compact_array(element: Layout) -> Self {
        Layout::Sequence(Sequence::new(element, Length::compact()))
    }

    pub fn seq(element: Layout, count: Length) -> Self {
        Layout::Sequence(Sequence::new(element, count))
    }

    pub fn structure(fields: Vec<Field>) -> Self {
        Layout::Structure(Structure::new(fields))
    }

    /// Fixed number of bytes if this layout does not depend on data.
    pub fn span(&self) -> Option<usize> {
        match self {
            Layout::Int(int) => Some(int.width()),
            Layout::CompactU16 | Layout::RustString => None,
            Layout::PublicKey => Some(PUBKEY_BYTES),
            Layout::Blob(Length::Fixed(n)) => Some(*n),
            Layout::Blob(_) => None,
            Layout::Sequence(seq) => seq.span(),
            Layout::Structure(structure) => structure.span(),
            Layout::Union(union) => union.span(),
            Layout::Bits(bits) => Some(bits.span()),
        }
    }

    /// Number of bytes this layout occupies at `offset`.
    pub fn get_span(&self, bytes: &[u8], offset: usize) -> Result<usize, LayoutError> {
        if let Some(span) = self.span() {
            return Ok(span);
        }
        match self {
            Layout::CompactU16 => shortvec::decode_length(bytes, offset).map(|(_, size)| size),
            Layout::RustString => {
                let len = IntLayout::U32.read_raw(bytes, offset)?;
                string_span(to_count(len)?)
            }
            Layout::Blob(Length::Remaining) => Ok(bytes.len().saturating_sub(offset)),
            Layout::Blob(length @ Length::Prefixed(_)) => {
                let (len, header) = length.decode_count(bytes, offset, None, Some(1))?;
                Ok(header + len)
            }
            _ => self.decode_in(bytes, offset, None).map(|(_, used)| used),
        }
    }

    pub fn decode(&self, bytes: &[u8], offset: usize) -> Result<Value, LayoutError> {
        self.decode_in(bytes, offset, None).map(|(value, _)| value)
    }

    /// Decode and also report how many bytes were consumed.
    pub fn decode_with_span(&self, bytes: &[u8], offset: usize) -> Result<(Value, usize), LayoutError> {
        self.decode_in(bytes, offset, None)
    }

    pub(crate) fn decode_in(
        &self,
        bytes: &[u8],
        offset: usize,
        ctx: Option<&Fields>,
    ) -> Result<(Value, usize), LayoutError> {
        match self {
            Layout::Int(int) => Ok((int.decode(bytes, offset)?, int.width())),
            Layout::CompactU16 => {
                let (value, size) = shortvec::decode_length(bytes, offset)?;
                Ok((Value::UInt(value as u64), size))
            }
            Layout::PublicKey => {
                ensure(bytes.len(), offset, PUBKEY_BYTES)?;
                let mut key = [0u8; PUBKEY_BYTES];
                key.copy_from_slice(&bytes[offset..offset + PUBKEY_BYTES]);
                Ok((Value::PublicKey(Pubkey::new_from_array(key)), PUBKEY_BYTES))
            }
            Layout::Blob(length) => {
                let (len, header) = length.decode_count(bytes, offset, ctx, Some(1))?;
                let start = offset + header;
                ensure(bytes.len(), start, len)?;
                Ok((Value::Bytes(bytes[start..start + len].to_vec()), header + len))
            }
            Layout::RustString => {
                let len = to_count(IntLayout::U32.read_raw(bytes, offset)?)?;
                let span = string_span(len)?;
                ensure(bytes.len(), offset, span)?;
                let start = offset + 8;
                let text = std::str::from_utf8(&bytes[start..start + len])
                    .map_err(|_| LayoutError::schema("string is not valid UTF-8"))?;
                Ok((Value::Str(text.to_string()), span))
            }
            Layout::Sequence(seq) => seq.decode_in(bytes, offset, ctx),
            Layout::Structure(structure) => structure.decode_in(bytes, offset),
            Layout::Union(union) => union.decode_in(bytes, offset),
            Layout::Bits(bits) => bits.decode_in(bytes, offset),
        }
    }

    /// Bytes `value` needs under this layout. Validates the value on the way.
    pub fn encoded_len(&self, value: &Value) -> Result<usize, LayoutError> {
        self.encoded_len_in(value, None)
    }

    pub(crate) fn encoded_len_in(&self, value: &Value, ctx: Option<&Fields>) -> Result<usize, LayoutError> {
        match self {
            Layout::Int(int) => {
                int.to_raw(value)?;
                Ok(int.width())
            }
            Layout::CompactU16 => {
                let n = value.as_u64().ok_or_else(|| value.mismatch("unsigned integer"))?;
                Ok(shortvec::encode_length(to_count(n)?)?.len())
            }
            Layout::PublicKey => {
                value.as_pubkey().ok_or_else(|| value.mismatch("public key"))?;
                Ok(PUBKEY_BYTES)
            }
            Layout::Blob(length) => {
                let data = value.as_bytes().ok_or_else(|| value.mismatch("bytes"))?;
                Ok(length.header_len(data.len(), ctx)? + data.len())
            }
            Layout::RustString => {
                let text = value.as_str().ok_or_else(|| value.mismatch("string"))?;
                string_span(text.len())
            }
            Layout::Sequence(seq) => seq.encoded_len_in(value, ctx),
            Layout::Structure(structure) => structure.encoded_len_in(value),
            Layout::Union(union) => union.encoded_len(value),
            Layout::Bits(bits) => {
                bits.to_word(value)?;
                Ok(bits.span())
            }
        }
    }

    /// Encode into `buf` at `offset`, returning the number of bytes written.
    pub fn encode(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize, LayoutError> {
        self.encode_in(value, buf, offset, None)
    }

    pub(crate) fn encode_in(
        &self,
        value: &Value,
        buf: &mut [u8],
        offset: usize,
        ctx: Option<&Fields>,
    ) -> Result<usize, LayoutError> {
        match self {
            Layout::Int(int) => int.encode(value, buf, offset),
            Layout::CompactU16 => {
                let n = value.as_u64().ok_or_else(|| value.mismatch("unsigned integer"))?;
                let encoded = shortvec::encode_length(to_count(n)?)?;
                write_slice(buf, offset, &encoded)
            }
            Layout::PublicKey => {
                let key = value.as_pubkey().ok_or_else(|| value.mismatch("public key"))?;
                write_slice(buf, offset, &key.to_bytes())
            }
            Layout::Blob(length) => {
                let data = value.as_bytes().ok_or_else(|| value.mismatch("bytes"))?;
                let header = length.encode_count(data.len(), buf, offset, ctx)?;
                Ok(header + write_slice(buf, offset + header, data)?)
            }
            Layout::RustString => {
                let text = value.as_str().ok_or_else(|| value.mismatch("string"))?;
                let len = u32::try_from(text.len())
                    .map_err(|_| LayoutError::schema("string longer than u32::MAX bytes"))?;
                let span = string_span(text.len())?;
                ensure(buf.len(), offset, span)?;
                IntLayout::U32.write_raw(len as u64, buf, offset)?;
                IntLayout::U32.write_raw(0, buf, offset + 4)?;
                write_slice(buf, offset + 8, text.as_bytes())?;
                Ok(span)
            }
            Layout::Sequence(seq) => seq.encode_in(value, buf, offset, ctx),
            Layout::Structure(structure) => structure.encode_in(value, buf, offset),
            Layout::Union(union) => union.encode_in(value, buf, offset),
            Layout::Bits(bits) => bits.encode_in(value, buf, offset),
        }
    }

    /// Append the encoding of `value` to `out`. Nothing is appended on error.
    pub fn encode_into(&self, value: &Value, out: &mut ByteBuffer) -> Result<usize, LayoutError> {
        let len = self.encoded_len(value)?;
        let start = out.len();
        let window = out.extend_zeroed(len);
        match self.encode(value, window, 0) {
            Ok(written) => Ok(written),
            Err(err) => {
                out.truncate(start);
                Err(err)
            }
        }
    }

    pub fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>, LayoutError> {
        let mut out = ByteBuffer::new();
        self.encode_into(value, &mut out)?;
        Ok(out.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_little_and_big_endian() {
        let mut buf = [0u8; 4];
        IntLayout::U32.encode(&Value::UInt(0x0102_0304), &mut buf, 0).unwrap();
        assert_eq!(buf, [4, 3, 2, 1]);
        IntLayout::U32
            .big_endian()
            .encode(&Value::UInt(0x0102_0304), &mut buf, 0)
            .unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(
            IntLayout::unsigned(3).big_endian().decode(&buf, 1).unwrap(),
            Value::UInt(0x02_0304)
        );
    }

    #[test]
    fn test_signed_ints_sign_extend() {
        let layout = Layout::i64();
        let bytes = layout.encode_to_vec(&Value::Int(-2)).unwrap();
        assert_eq!(bytes, vec![0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(layout.decode(&bytes, 0).unwrap(), Value::Int(-2));

        let i16_layout = Layout::Int(IntLayout::signed(2));
        assert_eq!(i16_layout.decode(&[0x00, 0x80], 0).unwrap(), Value::Int(-32768));
    }

    #[test]
    fn test_int_out_of_range() {
        let mut buf = [0u8; 8];
        assert!(Layout::u8().encode(&Value::UInt(256), &mut buf, 0).is_err());
        assert!(Layout::u32().encode(&Value::Int(-1), &mut buf, 0).is_err());
        assert!(Layout::Int(IntLayout::signed(1))
            .encode(&Value::Int(128), &mut buf, 0)
            .is_err());
        assert!(Layout::u64().encode(&Value::UInt(u64::MAX), &mut buf, 0).is_ok());
    }

    #[test]
    fn test_decode_insufficient_bytes() {
        let err = Layout::u64().decode(&[0; 4], 0).unwrap_err();
        assert_eq!(err, LayoutError::out_of_bounds(0, 8, 4));
    }

    #[test]
    fn test_encode_into_small_buffer() {
        let mut buf = [0u8; 31];
        let err = Layout::public_key()
            .encode(&Value::PublicKey(Pubkey::new_unique()), &mut buf, 0)
            .unwrap_err();
        assert!(matches!(err, LayoutError::OutOfBounds { needed: 32, .. }));
    }

    #[test]
    fn test_structure_padding() {
        let layout = Layout::structure(vec![
            Field::new("tag", Layout::u8()),
            Field::padding(Layout::blob(3)),
            Field::new("amount", Layout::u32()),
        ]);
        assert_eq!(layout.span(), Some(8));

        let value = Value::Struct(Fields::new().with("tag", 7u8).with("amount", 9u32));
        let mut buf = [0xaa; 8];
        assert_eq!(layout.encode(&value, &mut buf, 0).unwrap(), 8);
        assert_eq!(buf, [7, 0, 0, 0, 9, 0, 0, 0]);

        let decoded = layout.decode(&buf, 0).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.as_struct().unwrap().len(), 2);
    }

    #[test]
    fn test_compact_array_sizes() {
        let layout = Layout::compact_array(Layout::u8());
        for (count, prefix) in [(0usize, 1usize), (1, 1), (127, 1), (128, 2), (16383, 2), (16384, 3)] {
            let value = Value::Seq(vec![Value::UInt(1); count]);
            let bytes = layout.encode_to_vec(&value).unwrap();
            assert_eq!(bytes.len(), prefix + count, "count {}", count);
            assert_eq!(layout.get_span(&bytes, 0).unwrap(), prefix + count);
            assert_eq!(layout.decode(&bytes, 0).unwrap(), value);
        }
    }

    #[test]
    fn test_compact_bytes_span() {
        let layout = Layout::compact_bytes();
        assert_eq!(layout.span(), None);
        let bytes = [3, 1, 2, 3, 0xff];
        assert_eq!(layout.get_span(&bytes, 0).unwrap(), 4);
        assert_eq!(layout.decode(&bytes, 0).unwrap(), Value::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_field_counted_sequence() {
        let layout = Layout::structure(vec![
            Field::new("count", Layout::u64()),
            Field::new("keys", Layout::seq(Layout::public_key(), Length::field("count"))),
        ]);
        let keys = vec![Value::PublicKey(Pubkey::new_unique()), Value::PublicKey(Pubkey::new_unique())];
        let value = Value::Struct(
            Fields::new()
                .with("count", 2u64)
                .with("keys", Value::Seq(keys.clone())),
        );
        let bytes = layout.encode_to_vec(&value).unwrap();
        assert_eq!(bytes.len(), 8 + 64);
        assert_eq!(layout.decode(&bytes, 0).unwrap(), value);

        let wrong = Value::Struct(Fields::new().with("count", 3u64).with("keys", Value::Seq(keys)));
        let err = layout.encode_to_vec(&wrong).unwrap_err();
        assert_eq!(err.path().to_string(), "keys");
    }

    #[test]
    fn test_remaining_sequence() {
        let layout = Layout::seq(Layout::public_key(), Length::Remaining);
        assert_eq!(layout.decode(&[0; 64], 0).unwrap().as_seq().unwrap().len(), 2);
        assert_eq!(layout.decode(&[0; 64], 64).unwrap(), Value::Seq(vec![]));
        assert!(matches!(
            layout.decode(&[0; 65], 0),
            Err(LayoutError::Schema { .. })
        ));
    }

    #[test]
    fn test_error_path_points_at_field() {
        let layout = Layout::structure(vec![Field::new(
            "instructions",
            Layout::compact_array(Layout::structure(vec![Field::new(
                "data",
                Layout::compact_bytes(),
            )])),
        )]);
        let err = layout.decode(&[1, 5, 1, 2], 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "instructions[0].data: need 5 bytes at offset 2, only 2 available"
        );
    }

    #[test]
    fn test_missing_field_is_reported() {
        let layout = Layout::structure(vec![Field::new("owner", Layout::public_key())]);
        let err = layout
            .encode_to_vec(&Value::Struct(Fields::new()))
            .unwrap_err();
        assert_eq!(err.to_string(), "owner: missing field");
    }

    #[test]
    fn test_rust_string_matches_bincode() {
        let layout = Layout::rust_string();
        let bytes = layout.encode_to_vec(&Value::from("seed")).unwrap();
        assert_eq!(bytes, bincode::serialize("seed").unwrap());
        assert_eq!(layout.get_span(&bytes, 0).unwrap(), 12);
        assert_eq!(layout.decode(&bytes, 0).unwrap(), Value::from("seed"));
    }

    #[test]
    fn test_rust_string_huge_length_errors() {
        let layout = Layout::rust_string();
        let bytes = [0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, b'a'];
        assert!(layout.decode(&bytes, 0).is_err());
        assert!(string_span(usize::MAX).is_err());
        assert_eq!(string_span(4).unwrap(), 12);
    }

    #[test]
    fn test_encode_into_appends_only_on_success() {
        let mut out = ByteBuffer::new();
        out.write_u8(0xee);
        Layout::u16().encode_into(&Value::UInt(0x0201), &mut out).unwrap();
        assert!(Layout::u8().encode_into(&Value::UInt(999), &mut out).is_err());
        assert_eq!(out.as_slice(), &[0xee, 0x01, 0x02]);
    }
}

//! Dynamically typed values produced and consumed by [`Layout`](super::Layout).

use crate::error::LayoutError;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    UInt(u64),
    Int(i64),
    Bool(bool),
    PublicKey(Pubkey),
    Bytes(Vec<u8>),
    Str(String),
    Seq(Vec<Value>),
    Struct(Fields),
    Variant(Box<VariantValue>),
}

/// A decoded union member.
///
/// `property` is `None` when the discriminant was not registered and the
/// payload was decoded with the union's default layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantValue {
    pub discriminant: u64,
    pub property: Option<String>,
    pub payload: Value,
}

impl Value {
    pub fn variant(discriminant: u64, payload: Value) -> Value {
        Value::Variant(Box::new(VariantValue {
            discriminant,
            property: None,
            payload,
        }))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::UInt(_) => "unsigned integer",
            Value::Int(_) => "signed integer",
            Value::Bool(_) => "boolean",
            Value::PublicKey(_) => "public key",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Struct(_) => "struct",
            Value::Variant(_) => "variant",
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pubkey(&self) -> Option<&Pubkey> {
        match self {
            Value::PublicKey(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Fields> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_variant(&self) -> Option<&VariantValue> {
        match self {
            Value::Variant(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn mismatch(&self, expected: &str) -> LayoutError {
        LayoutError::schema(format!("expected {}, got {}", expected, self.kind_name()))
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<Pubkey> for Value {
    fn from(v: Pubkey) -> Self {
        Value::PublicKey(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Fields> for Value {
    fn from(v: Fields) -> Self {
        Value::Struct(v)
    }
}

/// Ordered named members of a struct value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Insert or replace a member, keeping first-insertion order.
    pub fn insert(&mut self, name: &str, value: Value) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Copy of these fields without `name`.
    pub fn without(&self, name: &str) -> Fields {
        Fields(self.0.iter().filter(|(n, _)| n != name).cloned().collect())
    }

    fn require(&self, name: &str) -> Result<&Value, LayoutError> {
        self.get(name)
            .ok_or_else(|| LayoutError::schema("missing field").within(name))
    }

    pub fn u64(&self, name: &str) -> Result<u64, LayoutError> {
        let value = self.require(name)?;
        value
            .as_u64()
            .ok_or_else(|| value.mismatch("unsigned integer").within(name))
    }

    pub fn i64(&self, name: &str) -> Result<i64, LayoutError> {
        let value = self.require(name)?;
        value
            .as_i64()
            .ok_or_else(|| value.mismatch("signed integer").within(name))
    }

    pub fn pubkey(&self, name: &str) -> Result<Pubkey, LayoutError> {
        let value = self.require(name)?;
        value
            .as_pubkey()
            .copied()
            .ok_or_else(|| value.mismatch("public key").within(name))
    }

    pub fn bytes(&self, name: &str) -> Result<&[u8], LayoutError> {
        let value = self.require(name)?;
        value
            .as_bytes()
            .ok_or_else(|| value.mismatch("bytes").within(name))
    }

    pub fn str(&self, name: &str) -> Result<&str, LayoutError> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| value.mismatch("string").within(name))
    }

    pub fn seq(&self, name: &str) -> Result<&[Value], LayoutError> {
        let value = self.require(name)?;
        value
            .as_seq()
            .ok_or_else(|| value.mismatch("sequence").within(name))
    }

    pub fn fields(&self, name: &str) -> Result<&Fields, LayoutError> {
        let value = self.require(name)?;
        value
            .as_struct()
            .ok_or_else(|| value.mismatch("struct").within(name))
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(&name, value);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_insert_replaces_in_place() {
        let mut fields = Fields::new().with("a", 1u64).with("b", 2u64);
        fields.insert("a", Value::UInt(5));
        let names: Vec<&str> = fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(fields.u64("a").unwrap(), 5);
    }

    #[test]
    fn test_typed_getter_errors_name_the_field() {
        let fields = Fields::new().with("lamports", "not a number");
        let err = fields.u64("lamports").unwrap_err();
        assert_eq!(
            err.to_string(),
            "lamports: expected unsigned integer, got string"
        );
        let err = fields.pubkey("owner").unwrap_err();
        assert_eq!(err.to_string(), "owner: missing field");
    }

    #[test]
    fn test_integer_views() {
        assert_eq!(Value::Int(7).as_u64(), Some(7));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
    }
}

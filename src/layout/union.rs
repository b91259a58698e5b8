//! Tagged unions: an integer discriminant followed by a variant payload.

use super::{Fields, IntLayout, Layout, Value, VariantValue};
use crate::error::LayoutError;
use std::borrow::Cow;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct VariantLayout {
    pub discriminant: u64,
    /// Name the payload is reported under, e.g. `"transfer"`.
    pub property: String,
    pub layout: Layout,
}

/// Registry of variants keyed by discriminant, fixed once built.
#[derive(Debug, Clone)]
pub struct Union {
    discriminator: IntLayout,
    discriminant_property: Option<String>,
    variants: BTreeMap<u64, VariantLayout>,
    default: Option<Box<Layout>>,
}

impl Union {
    pub fn new(discriminator: IntLayout) -> Self {
        Union {
            discriminator,
            discriminant_property: None,
            variants: BTreeMap::new(),
            default: None,
        }
    }

    /// Name of the struct member that may carry the discriminant when encoding
    /// a flat struct, e.g. `{ "instruction": 2, "lamports": 5000 }`.
    pub fn with_discriminant_property(mut self, name: &str) -> Self {
        self.discriminant_property = Some(name.to_string());
        self
    }

    /// Payload layout for discriminants with no registered variant.
    pub fn with_default(mut self, layout: Layout) -> Self {
        self.default = Some(Box::new(layout));
        self
    }

    pub fn add_variant(
        mut self,
        discriminant: u64,
        property: &str,
        layout: Layout,
    ) -> Result<Self, LayoutError> {
        self.discriminator
            .to_raw(&Value::UInt(discriminant))
            .map_err(|e| e.within(property))?;
        if self.variants.contains_key(&discriminant) {
            return Err(LayoutError::schema(format!(
                "discriminant {} registered twice",
                discriminant
            )));
        }
        if self.variant_by_property(property).is_some() {
            return Err(LayoutError::schema(format!(
                "variant property `{}` registered twice",
                property
            )));
        }
        self.variants.insert(
            discriminant,
            VariantLayout {
                discriminant,
                property: property.to_string(),
                layout,
            },
        );
        Ok(self)
    }

    pub fn discriminator(&self) -> IntLayout {
        self.discriminator
    }

    pub fn variant(&self, discriminant: u64) -> Option<&VariantLayout> {
        self.variants.get(&discriminant)
    }

    pub fn variant_by_property(&self, property: &str) -> Option<&VariantLayout> {
        self.variants.values().find(|v| v.property == property)
    }

    pub fn variants(&self) -> impl Iterator<Item = &VariantLayout> {
        self.variants.values()
    }

    /// Fixed only when every payload layout has the same fixed span.
    pub(super) fn span(&self) -> Option<usize> {
        let mut payloads = self
            .variants
            .values()
            .map(|v| &v.layout)
            .chain(self.default.as_deref());
        let first = payloads.next()?.span()?;
        for layout in payloads {
            if layout.span()? != first {
                return None;
            }
        }
        Some(self.discriminator.width() + first)
    }

    pub(super) fn decode_in(&self, bytes: &[u8], offset: usize) -> Result<(Value, usize), LayoutError> {
        let discriminant = self
            .discriminator
            .read_raw(bytes, offset)
            .map_err(|e| e.within("discriminant"))?;
        let payload_offset = offset + self.discriminator.width();
        let (property, layout) = match (self.variants.get(&discriminant), &self.default) {
            (Some(variant), _) => (Some(variant.property.clone()), &variant.layout),
            (None, Some(default)) => (None, default.as_ref()),
            (None, None) => {
                return Err(LayoutError::schema(format!(
                    "unknown discriminant {} and no default layout",
                    discriminant
                )))
            }
        };
        let (payload, used) = layout
            .decode_in(bytes, payload_offset, None)
            .map_err(|e| e.within(property.as_deref().unwrap_or("default")))?;
        let value = Value::Variant(Box::new(VariantValue {
            discriminant,
            property,
            payload,
        }));
        Ok((value, self.discriminator.width() + used))
    }

    /// Work out discriminant, payload layout and payload value for `value`.
    fn resolve<'a>(&'a self, value: &'a Value) -> Result<Resolved<'a>, LayoutError> {
        match value {
            Value::Variant(variant) => {
                let layout = match (self.variants.get(&variant.discriminant), &self.default) {
                    (Some(registered), _) => &registered.layout,
                    (None, Some(default)) => default.as_ref(),
                    (None, None) => {
                        return Err(LayoutError::schema(format!(
                            "unknown discriminant {} and no default layout",
                            variant.discriminant
                        )))
                    }
                };
                Ok(Resolved {
                    discriminant: variant.discriminant,
                    label: variant.property.as_deref().unwrap_or("default"),
                    layout,
                    payload: Cow::Borrowed(&variant.payload),
                })
            }
            Value::Struct(fields) => self.resolve_struct(fields),
            other => Err(other.mismatch("variant or struct")),
        }
    }

    fn resolve_struct<'a>(&'a self, fields: &'a Fields) -> Result<Resolved<'a>, LayoutError> {
        if let Some(tag) = self.discriminant_property.as_deref() {
            if fields.contains(tag) {
                let discriminant = fields.u64(tag)?;
                let variant = self.variants.get(&discriminant).ok_or_else(|| {
                    LayoutError::schema(format!("no variant registered for discriminant {}", discriminant))
                        .within(tag)
                })?;
                let payload = match fields.get(&variant.property) {
                    Some(nested) => Cow::Borrowed(nested),
                    None => Cow::Owned(Value::Struct(fields.without(tag))),
                };
                return Ok(Resolved {
                    discriminant,
                    label: &variant.property,
                    layout: &variant.layout,
                    payload,
                });
            }
        }
        let variant = self
            .variants
            .values()
            .find(|v| fields.contains(&v.property))
            .ok_or_else(|| LayoutError::schema("value matches no registered variant"))?;
        let payload = fields
            .get(&variant.property)
            .map(Cow::Borrowed)
            .ok_or_else(|| LayoutError::schema("missing field").within(variant.property.as_str()))?;
        Ok(Resolved {
            discriminant: variant.discriminant,
            label: &variant.property,
            layout: &variant.layout,
            payload,
        })
    }

    pub(super) fn encoded_len(&self, value: &Value) -> Result<usize, LayoutError> {
        let resolved = self.resolve(value)?;
        let payload = resolved
            .layout
            .encoded_len_in(&resolved.payload, None)
            .map_err(|e| e.within(resolved.label))?;
        Ok(self.discriminator.width() + payload)
    }

    pub(super) fn encode_in(&self, value: &Value, buf: &mut [u8], offset: usize) -> Result<usize, LayoutError> {
        let resolved = self.resolve(value)?;
        let header = self
            .discriminator
            .write_raw(resolved.discriminant, buf, offset)
            .map_err(|e| e.within("discriminant"))?;
        let payload = resolved
            .layout
            .encode_in(&resolved.payload, buf, offset + header, None)
            .map_err(|e| e.within(resolved.label))?;
        Ok(header + payload)
    }
}

struct Resolved<'a> {
    discriminant: u64,
    label: &'a str,
    layout: &'a Layout,
    payload: Cow<'a, Value>,
}

#[cfg(test)]
mod tests {
    use super::super::Field;
    use super::*;
    use solana_pubkey::Pubkey;

    fn sample_union() -> Union {
        Union::new(IntLayout::U8)
            .with_discriminant_property("kind")
            .with_default(Layout::blob(4))
            .add_variant(0, "ping", Layout::structure(vec![]))
            .unwrap()
            .add_variant(
                1,
                "amount",
                Layout::structure(vec![Field::new("lamports", Layout::u32())]),
            )
            .unwrap()
            .add_variant(
                2,
                "owner",
                Layout::structure(vec![Field::new("key", Layout::public_key())]),
            )
            .unwrap()
    }

    #[test]
    fn test_round_trip_each_variant() {
        let layout = Layout::Union(sample_union());
        let key = Pubkey::new_unique();
        for (discriminant, property, payload) in [
            (0u64, "ping", Fields::new()),
            (1, "amount", Fields::new().with("lamports", 5000u32)),
            (2, "owner", Fields::new().with("key", key)),
        ] {
            let value = Value::Variant(Box::new(VariantValue {
                discriminant,
                property: Some(property.to_string()),
                payload: Value::Struct(payload),
            }));
            let bytes = layout.encode_to_vec(&value).unwrap();
            assert_eq!(bytes[0] as u64, discriminant);
            assert_eq!(layout.decode(&bytes, 0).unwrap(), value);
        }
    }

    #[test]
    fn test_unknown_discriminant_uses_default() {
        let layout = Layout::Union(sample_union());
        let decoded = layout.decode(&[9, 1, 2, 3, 4], 0).unwrap();
        let variant = decoded.as_variant().unwrap();
        assert_eq!(variant.discriminant, 9);
        assert_eq!(variant.property, None);
        assert_eq!(variant.payload, Value::Bytes(vec![1, 2, 3, 4]));

        let bytes = layout.encode_to_vec(&decoded).unwrap();
        assert_eq!(bytes, vec![9, 1, 2, 3, 4]);
    }

    #[test]
    fn test_unknown_discriminant_without_default() {
        let union = Union::new(IntLayout::U32)
            .add_variant(2, "transfer", Layout::u64())
            .unwrap();
        let err = Layout::Union(union).decode(&[7, 0, 0, 0], 0).unwrap_err();
        assert!(matches!(err, LayoutError::Schema { .. }));
    }

    #[test]
    fn test_encode_flat_struct_with_discriminant_property() {
        let layout = Layout::Union(sample_union());
        let flat = Value::Struct(Fields::new().with("kind", 1u8).with("lamports", 7u32));
        assert_eq!(layout.encode_to_vec(&flat).unwrap(), vec![1, 7, 0, 0, 0]);
    }

    #[test]
    fn test_encode_by_property_presence() {
        let layout = Layout::Union(sample_union());
        let value = Value::Struct(
            Fields::new().with("amount", Fields::new().with("lamports", 1u32)),
        );
        assert_eq!(layout.encode_to_vec(&value).unwrap(), vec![1, 1, 0, 0, 0]);

        let nothing = Value::Struct(Fields::new().with("other", 1u8));
        assert!(layout.encode_to_vec(&nothing).is_err());
    }

    #[test]
    fn test_payload_error_names_variant() {
        let layout = Layout::Union(sample_union());
        let value = Value::Struct(
            Fields::new().with("amount", Fields::new().with("lamports", u64::MAX)),
        );
        let err = layout.encode_to_vec(&value).unwrap_err();
        assert_eq!(err.path().to_string(), "amount.lamports");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let union = Union::new(IntLayout::U8)
            .add_variant(0, "a", Layout::u8())
            .unwrap();
        assert!(union.clone().add_variant(0, "b", Layout::u8()).is_err());
        assert!(union.add_variant(1, "a", Layout::u8()).is_err());
        assert!(Union::new(IntLayout::U8)
            .add_variant(300, "big", Layout::u8())
            .is_err());
    }

    #[test]
    fn test_span() {
        assert_eq!(Layout::Union(sample_union()).span(), None);
        let fixed = Union::new(IntLayout::U32)
            .add_variant(0, "a", Layout::u64())
            .unwrap()
            .add_variant(1, "b", Layout::blob(8))
            .unwrap();
        assert_eq!(Layout::Union(fixed).span(), Some(12));
    }
}

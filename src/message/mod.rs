//! Transaction messages: compilation from instructions, wire encoding and
//! decompilation, for both the legacy and the version-0 format.
//!
//! # Wire Format
//!
//! ```text
//! legacy: [header: 3 bytes] [compact-array<pubkey>] [blockhash: 32] [compact-array<instruction>]
//! v0:     [0x80 | version] <legacy body> [compact-array<address table lookup>]
//! ```
//!
//! All encoding goes through the [`Layout`] trees built by [`MessageSchema`].

mod account_keys;
mod compiled_keys;
mod legacy;
mod transaction_message;
mod v0;
mod versions;

pub use account_keys::{LoadedAddresses, LookupSource, MessageAccountKeys};
pub use compiled_keys::{CompiledKeys, KeyMeta};
pub use legacy::Message;
pub use transaction_message::TransactionMessage;
pub use v0::{MessageAddressTableLookup, MessageV0};
pub use versions::{deserialize_message_version, TxVersion, VersionedMessage};

use crate::error::LayoutError;
use crate::layout::{Field, Fields, Layout, Value};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use std::sync::OnceLock;

/// Maximum over-the-wire size of a transaction, signatures included.
pub const PACKET_DATA_SIZE: usize = 1280 - 40 - 8;
/// High bit of the first message byte marks a versioned message.
pub const MESSAGE_VERSION_PREFIX: u8 = 0x80;
pub const VERSION_PREFIX_MASK: u8 = 0x7f;
pub const SIGNATURE_LENGTH: usize = 64;
pub const PUBKEY_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

impl MessageHeader {
    fn to_value(self) -> Value {
        Value::Struct(
            Fields::new()
                .with("numRequiredSignatures", self.num_required_signatures)
                .with("numReadonlySignedAccounts", self.num_readonly_signed_accounts)
                .with("numReadonlyUnsignedAccounts", self.num_readonly_unsigned_accounts),
        )
    }

    /// Read the `header` member of a decoded message.
    fn from_fields(message: &Fields) -> Result<Self, LayoutError> {
        Self::from_value(&Value::Struct(message.fields("header")?.clone()))
            .map_err(|e| e.within("header"))
    }

    fn from_value(value: &Value) -> Result<Self, LayoutError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let byte = |name: &str| -> Result<u8, LayoutError> {
            u8::try_from(fields.u64(name)?)
                .map_err(|_| LayoutError::schema("count exceeds u8").within(name))
        };
        Ok(MessageHeader {
            num_required_signatures: byte("numRequiredSignatures")?,
            num_readonly_signed_accounts: byte("numReadonlySignedAccounts")?,
            num_readonly_unsigned_accounts: byte("numReadonlyUnsignedAccounts")?,
        })
    }
}

/// Layout trees for every message-level wire structure.
///
/// Built once on first use and shared; layouts are immutable.
pub struct MessageSchema;

impl MessageSchema {
    pub fn header() -> Layout {
        Layout::structure(vec![
            Field::new("numRequiredSignatures", Layout::u8()),
            Field::new("numReadonlySignedAccounts", Layout::u8()),
            Field::new("numReadonlyUnsignedAccounts", Layout::u8()),
        ])
    }

    pub fn compiled_instruction() -> Layout {
        Layout::structure(vec![
            Field::new("programIdIndex", Layout::u8()),
            Field::new("accounts", Layout::compact_array(Layout::u8())),
            Field::new("data", Layout::compact_bytes()),
        ])
    }

    pub fn address_table_lookup() -> Layout {
        Layout::structure(vec![
            Field::new("accountKey", Layout::public_key()),
            Field::new("writableIndexes", Layout::compact_array(Layout::u8())),
            Field::new("readonlyIndexes", Layout::compact_array(Layout::u8())),
        ])
    }

    fn body_fields() -> Vec<Field> {
        vec![
            Field::new("header", Self::header()),
            Field::new("accountKeys", Layout::compact_array(Layout::public_key())),
            Field::new("recentBlockhash", Layout::blob(32)),
            Field::new(
                "instructions",
                Layout::compact_array(Self::compiled_instruction()),
            ),
        ]
    }

    pub fn legacy() -> &'static Layout {
        static LEGACY: OnceLock<Layout> = OnceLock::new();
        LEGACY.get_or_init(|| Layout::structure(Self::body_fields()))
    }

    pub fn v0() -> &'static Layout {
        static V0: OnceLock<Layout> = OnceLock::new();
        V0.get_or_init(|| {
            let mut fields = vec![Field::new("prefix", Layout::u8())];
            fields.extend(Self::body_fields());
            fields.push(Field::new(
                "addressTableLookups",
                Layout::compact_array(Self::address_table_lookup()),
            ));
            Layout::structure(fields)
        })
    }

    /// `compact-array<signature: 64 bytes>` at the front of every transaction.
    pub fn signatures() -> &'static Layout {
        static SIGNATURES: OnceLock<Layout> = OnceLock::new();
        SIGNATURES.get_or_init(|| Layout::compact_array(Layout::blob(SIGNATURE_LENGTH)))
    }
}

pub(crate) fn keys_to_value(keys: &[Pubkey]) -> Value {
    Value::Seq(keys.iter().map(|k| Value::PublicKey(*k)).collect())
}

pub(crate) fn keys_from_value(items: &[Value]) -> Result<Vec<Pubkey>, LayoutError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_pubkey()
                .copied()
                .ok_or_else(|| item.mismatch("public key").within(format!("[{}]", i)))
        })
        .collect()
}

pub(crate) fn hash_from_value(fields: &Fields, name: &str) -> Result<Hash, LayoutError> {
    let bytes = fields.bytes(name)?;
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| LayoutError::schema("blockhash must be 32 bytes").within(name))?;
    Ok(Hash::new_from_array(array))
}

/// Decode a whole buffer with `layout`, rejecting trailing bytes.
pub(crate) fn decode_exact(layout: &Layout, bytes: &[u8]) -> Result<Value, LayoutError> {
    let (value, used) = layout.decode_with_span(bytes, 0)?;
    if used != bytes.len() {
        return Err(LayoutError::schema(format!(
            "{} trailing bytes after message",
            bytes.len() - used
        )));
    }
    Ok(value)
}

/// Writable flag for index `index` of a static key table under `header`.
pub(crate) fn is_static_writable(header: &MessageHeader, num_static: usize, index: usize) -> bool {
    let num_signed = header.num_required_signatures as usize;
    if index < num_signed {
        index < num_signed.saturating_sub(header.num_readonly_signed_accounts as usize)
    } else {
        let num_unsigned = num_static.saturating_sub(num_signed);
        let num_writable_unsigned =
            num_unsigned.saturating_sub(header.num_readonly_unsigned_accounts as usize);
        index - num_signed < num_writable_unsigned
    }
}

//! Address lookup table accounts.
//!
//! # Account Layout
//!
//! ```text
//! [0..56)  meta: type index (u32 = 1), deactivation slot (u64),
//!          last extended slot (u64), last extended start index (u8),
//!          authority option (u8) + authority (0 or 32 bytes), zero padding
//! [56..)   addresses, 32 bytes each
//! ```

pub mod instruction;

use crate::error::{LayoutError, WasmSolanaError};
use crate::layout::{Field, Fields, Layout, Length, Value};
use crate::message::PUBKEY_LENGTH;
use solana_pubkey::Pubkey;
use std::sync::OnceLock;

pub use instruction::{LookupTableInstruction, ID as ADDRESS_LOOKUP_TABLE_PROGRAM_ID};

pub const LOOKUP_TABLE_META_SIZE: usize = 56;
pub const LOOKUP_TABLE_MAX_ADDRESSES: usize = 256;
const LOOKUP_TABLE_TYPE_INDEX: u64 = 1;

fn meta_layout() -> &'static Layout {
    static META: OnceLock<Layout> = OnceLock::new();
    META.get_or_init(|| {
        Layout::structure(vec![
            Field::new("typeIndex", Layout::u32()),
            Field::new("deactivationSlot", Layout::u64()),
            Field::new("lastExtendedSlot", Layout::u64()),
            Field::new("lastExtendedStartIndex", Layout::u8()),
            Field::new("authorityOption", Layout::u8()),
            Field::new(
                "authority",
                Layout::seq(Layout::public_key(), Length::field("authorityOption")),
            ),
        ])
    })
}

fn addresses_layout() -> &'static Layout {
    static ADDRESSES: OnceLock<Layout> = OnceLock::new();
    ADDRESSES.get_or_init(|| Layout::seq(Layout::public_key(), Length::Remaining))
}

/// Decoded contents of a lookup table account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLookupTableState {
    pub deactivation_slot: u64,
    pub last_extended_slot: u64,
    pub last_extended_slot_start_index: u8,
    pub authority: Option<Pubkey>,
    pub addresses: Vec<Pubkey>,
}

impl Default for AddressLookupTableState {
    fn default() -> Self {
        AddressLookupTableState {
            deactivation_slot: u64::MAX,
            last_extended_slot: 0,
            last_extended_slot_start_index: 0,
            authority: None,
            addresses: Vec::new(),
        }
    }
}

impl AddressLookupTableState {
    pub fn deserialize(data: &[u8]) -> Result<Self, WasmSolanaError> {
        if data.len() < LOOKUP_TABLE_META_SIZE {
            return Err(WasmSolanaError::new(&format!(
                "lookup table is invalid: {} bytes is shorter than the {}-byte header",
                data.len(),
                LOOKUP_TABLE_META_SIZE
            )));
        }
        if (data.len() - LOOKUP_TABLE_META_SIZE) % PUBKEY_LENGTH != 0 {
            return Err(WasmSolanaError::new(
                "lookup table is invalid: address data is not a multiple of 32 bytes",
            ));
        }
        let num_addresses = (data.len() - LOOKUP_TABLE_META_SIZE) / PUBKEY_LENGTH;
        if num_addresses > LOOKUP_TABLE_MAX_ADDRESSES {
            return Err(WasmSolanaError::new(&format!(
                "lookup table is invalid: {} addresses exceeds the maximum of {}",
                num_addresses, LOOKUP_TABLE_MAX_ADDRESSES
            )));
        }

        let meta = meta_layout().decode(&data[..LOOKUP_TABLE_META_SIZE], 0)?;
        let meta = meta.as_struct().ok_or_else(|| meta.mismatch("struct"))?;
        let type_index = meta.u64("typeIndex")?;
        if type_index != LOOKUP_TABLE_TYPE_INDEX {
            return Err(WasmSolanaError::new(&format!(
                "invalid account data; account type mismatch {} != {}",
                type_index, LOOKUP_TABLE_TYPE_INDEX
            )));
        }
        let authority = match meta.seq("authority")? {
            [] => None,
            [key] => Some(
                *key.as_pubkey()
                    .ok_or_else(|| key.mismatch("public key").within("authority"))?,
            ),
            _ => {
                return Err(LayoutError::schema("authority option must be 0 or 1")
                    .within("authorityOption")
                    .into())
            }
        };

        let addresses = addresses_layout().decode(data, LOOKUP_TABLE_META_SIZE)?;
        let addresses = crate::message::keys_from_value(
            addresses.as_seq().ok_or_else(|| addresses.mismatch("sequence"))?,
        )
        .map_err(|e| e.within("addresses"))?;

        Ok(AddressLookupTableState {
            deactivation_slot: meta.u64("deactivationSlot")?,
            last_extended_slot: meta.u64("lastExtendedSlot")?,
            last_extended_slot_start_index: meta.u64("lastExtendedStartIndex")? as u8,
            authority,
            addresses,
        })
    }

    /// Account data as the lookup table program stores it.
    pub fn serialize(&self) -> Result<Vec<u8>, LayoutError> {
        let authority: Vec<Value> = self.authority.iter().map(|k| Value::PublicKey(*k)).collect();
        let meta = Value::Struct(
            Fields::new()
                .with("typeIndex", LOOKUP_TABLE_TYPE_INDEX)
                .with("deactivationSlot", self.deactivation_slot)
                .with("lastExtendedSlot", self.last_extended_slot)
                .with("lastExtendedStartIndex", self.last_extended_slot_start_index)
                .with("authorityOption", authority.len() as u64)
                .with("authority", Value::Seq(authority)),
        );
        let mut data = vec![0u8; LOOKUP_TABLE_META_SIZE];
        meta_layout().encode(&meta, &mut data, 0)?;
        data.extend(
            addresses_layout().encode_to_vec(&crate::message::keys_to_value(&self.addresses))?,
        );
        Ok(data)
    }

    /// A table is active until it is deactivated.
    pub fn is_active(&self) -> bool {
        self.deactivation_slot == u64::MAX
    }
}

/// A lookup table account: its address plus decoded state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLookupTableAccount {
    pub key: Pubkey,
    pub state: AddressLookupTableState,
}

impl AddressLookupTableAccount {
    pub fn new(key: Pubkey, state: AddressLookupTableState) -> Self {
        AddressLookupTableAccount { key, state }
    }

    /// Decode raw account data fetched for `key`.
    pub fn from_account_data(key: Pubkey, data: &[u8]) -> Result<Self, WasmSolanaError> {
        Ok(AddressLookupTableAccount {
            key,
            state: AddressLookupTableState::deserialize(data)?,
        })
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn addresses(&self) -> &[Pubkey] {
        &self.state.addresses
    }
}

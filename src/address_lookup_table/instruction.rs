//! Address Lookup Table program instructions.
//!
//! # Wire Format
//!
//! A little-endian `u32` discriminant followed by the variant payload:
//! - 0: CreateLookupTable (recent slot u64, bump seed u8)
//! - 1: FreezeLookupTable
//! - 2: ExtendLookupTable (u64 count, then 32-byte addresses)
//! - 3: DeactivateLookupTable
//! - 4: CloseLookupTable

use crate::error::{LayoutError, WasmSolanaError};
use crate::instruction::{AccountMeta, Instruction};
use crate::instructions::system;
use crate::layout::{Field, Fields, IntLayout, Layout, Length, Union, Value};
use solana_pubkey::Pubkey;
use std::sync::OnceLock;

/// Address Lookup Table program ID.
pub const ID: Pubkey = Pubkey::from_str_const("AddressLookupTab1e1111111111111111111111111");

const CREATE: u64 = 0;
const FREEZE: u64 = 1;
const EXTEND: u64 = 2;
const DEACTIVATE: u64 = 3;
const CLOSE: u64 = 4;

fn build_layout() -> Result<Layout, LayoutError> {
    let union = Union::new(IntLayout::U32)
        .with_discriminant_property("instruction")
        .add_variant(
            CREATE,
            "createLookupTable",
            Layout::structure(vec![
                Field::new("recentSlot", Layout::u64()),
                Field::new("bumpSeed", Layout::u8()),
            ]),
        )?
        .add_variant(FREEZE, "freezeLookupTable", Layout::structure(vec![]))?
        .add_variant(
            EXTEND,
            "extendLookupTable",
            Layout::structure(vec![
                Field::new("count", Layout::u64()),
                Field::new(
                    "addresses",
                    Layout::seq(Layout::public_key(), Length::field("count")),
                ),
            ]),
        )?
        .add_variant(DEACTIVATE, "deactivateLookupTable", Layout::structure(vec![]))?
        .add_variant(CLOSE, "closeLookupTable", Layout::structure(vec![]))?;
    Ok(Layout::Union(union))
}

/// Instruction data layout, shared by encoding and decoding.
pub fn instruction_layout() -> Result<&'static Layout, LayoutError> {
    static LAYOUT: OnceLock<Result<Layout, LayoutError>> = OnceLock::new();
    LAYOUT.get_or_init(build_layout).as_ref().map_err(Clone::clone)
}

/// Decoded lookup table program instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTableInstruction {
    /// Accounts: [table (w), authority (s), payer (s, w), system program]
    CreateLookupTable { recent_slot: u64, bump_seed: u8 },
    /// Accounts: [table (w), authority (s)]
    FreezeLookupTable,
    /// Accounts: [table (w), authority (s), optional payer (s, w), optional system program]
    ExtendLookupTable { new_addresses: Vec<Pubkey> },
    /// Accounts: [table (w), authority (s)]
    DeactivateLookupTable,
    /// Accounts: [table (w), authority (s), recipient (w)]
    CloseLookupTable,
}

impl LookupTableInstruction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateLookupTable { .. } => "CreateLookupTable",
            Self::FreezeLookupTable => "FreezeLookupTable",
            Self::ExtendLookupTable { .. } => "ExtendLookupTable",
            Self::DeactivateLookupTable => "DeactivateLookupTable",
            Self::CloseLookupTable => "CloseLookupTable",
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::CreateLookupTable {
                recent_slot,
                bump_seed,
            } => Value::variant(
                CREATE,
                Value::Struct(
                    Fields::new()
                        .with("recentSlot", *recent_slot)
                        .with("bumpSeed", *bump_seed),
                ),
            ),
            Self::FreezeLookupTable => Value::variant(FREEZE, Value::Struct(Fields::new())),
            Self::ExtendLookupTable { new_addresses } => Value::variant(
                EXTEND,
                Value::Struct(
                    Fields::new()
                        .with("count", new_addresses.len() as u64)
                        .with("addresses", crate::message::keys_to_value(new_addresses)),
                ),
            ),
            Self::DeactivateLookupTable => {
                Value::variant(DEACTIVATE, Value::Struct(Fields::new()))
            }
            Self::CloseLookupTable => Value::variant(CLOSE, Value::Struct(Fields::new())),
        }
    }

    pub fn pack(&self) -> Result<Vec<u8>, LayoutError> {
        instruction_layout()?.encode_to_vec(&self.to_value())
    }

    pub fn unpack(data: &[u8]) -> Result<Self, WasmSolanaError> {
        let value = instruction_layout()?.decode(data, 0)?;
        let variant = value.as_variant().ok_or_else(|| value.mismatch("variant"))?;
        let payload = variant
            .payload
            .as_struct()
            .ok_or_else(|| variant.payload.mismatch("struct"))?;
        let instruction = match variant.discriminant {
            CREATE => Self::CreateLookupTable {
                recent_slot: payload.u64("recentSlot")?,
                bump_seed: payload.u64("bumpSeed")? as u8,
            },
            FREEZE => Self::FreezeLookupTable,
            EXTEND => Self::ExtendLookupTable {
                new_addresses: crate::message::keys_from_value(payload.seq("addresses")?)
                    .map_err(|e| e.within("addresses"))?,
            },
            DEACTIVATE => Self::DeactivateLookupTable,
            CLOSE => Self::CloseLookupTable,
            other => {
                return Err(WasmSolanaError::new(&format!(
                    "Unknown LookupTable instruction discriminator: {}",
                    other
                )))
            }
        };
        Ok(instruction)
    }
}

/// Address of the table `authority` creates at `recent_slot`, and its bump seed.
pub fn derive_lookup_table_address(authority: &Pubkey, recent_slot: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[authority.as_ref(), &recent_slot.to_le_bytes()], &ID)
}

/// Create a lookup table. Returns the instruction and the new table address.
pub fn create_lookup_table(
    authority: Pubkey,
    payer: Pubkey,
    recent_slot: u64,
) -> Result<(Instruction, Pubkey), LayoutError> {
    let (table, bump_seed) = derive_lookup_table_address(&authority, recent_slot);
    let data = LookupTableInstruction::CreateLookupTable {
        recent_slot,
        bump_seed,
    }
    .pack()?;
    let instruction = Instruction::new(
        ID,
        vec![
            AccountMeta::new(table, false),
            AccountMeta::new_readonly(authority, true),
            AccountMeta::new(payer, true),
            AccountMeta::new_readonly(system::ID, false),
        ],
        data,
    );
    Ok((instruction, table))
}

pub fn freeze_lookup_table(table: Pubkey, authority: Pubkey) -> Result<Instruction, LayoutError> {
    Ok(Instruction::new(
        ID,
        vec![
            AccountMeta::new(table, false),
            AccountMeta::new_readonly(authority, true),
        ],
        LookupTableInstruction::FreezeLookupTable.pack()?,
    ))
}

/// Append addresses to a table. A payer is needed when the account must grow
/// beyond its rent-exempt balance.
pub fn extend_lookup_table(
    table: Pubkey,
    authority: Pubkey,
    payer: Option<Pubkey>,
    new_addresses: Vec<Pubkey>,
) -> Result<Instruction, LayoutError> {
    let mut accounts = vec![
        AccountMeta::new(table, false),
        AccountMeta::new_readonly(authority, true),
    ];
    if let Some(payer) = payer {
        accounts.push(AccountMeta::new(payer, true));
        accounts.push(AccountMeta::new_readonly(system::ID, false));
    }
    let data = LookupTableInstruction::ExtendLookupTable { new_addresses }.pack()?;
    Ok(Instruction::new(ID, accounts, data))
}

pub fn deactivate_lookup_table(
    table: Pubkey,
    authority: Pubkey,
) -> Result<Instruction, LayoutError> {
    Ok(Instruction::new(
        ID,
        vec![
            AccountMeta::new(table, false),
            AccountMeta::new_readonly(authority, true),
        ],
        LookupTableInstruction::DeactivateLookupTable.pack()?,
    ))
}

pub fn close_lookup_table(
    table: Pubkey,
    authority: Pubkey,
    recipient: Pubkey,
) -> Result<Instruction, LayoutError> {
    Ok(Instruction::new(
        ID,
        vec![
            AccountMeta::new(table, false),
            AccountMeta::new_readonly(authority, true),
            AccountMeta::new(recipient, false),
        ],
        LookupTableInstruction::CloseLookupTable.pack()?,
    ))
}

//! Version 0 messages, which may load accounts from address lookup tables.

use super::account_keys::{LoadedAddresses, LookupSource, MessageAccountKeys};
use super::compiled_keys::CompiledKeys;
use super::{
    hash_from_value, is_static_writable, keys_from_value, keys_to_value, MessageHeader,
    MessageSchema, MESSAGE_VERSION_PREFIX, VERSION_PREFIX_MASK,
};
use crate::address_lookup_table::AddressLookupTableAccount;
use crate::error::{CompileError, DecompileError, LayoutError, WasmSolanaError};
use crate::instruction::{indexes_from_value, CompiledInstruction, Instruction};
use crate::layout::{Fields, Value};
use solana_hash::Hash;
use solana_pubkey::Pubkey;

/// Reference from a v0 message into one lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageAddressTableLookup {
    pub account_key: Pubkey,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

impl MessageAddressTableLookup {
    fn to_value(&self) -> Value {
        let indexes = |list: &[u8]| Value::Seq(list.iter().map(|i| Value::UInt(*i as u64)).collect());
        Value::Struct(
            Fields::new()
                .with("accountKey", self.account_key)
                .with("writableIndexes", indexes(&self.writable_indexes))
                .with("readonlyIndexes", indexes(&self.readonly_indexes)),
        )
    }

    fn from_value(value: &Value) -> Result<Self, LayoutError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        Ok(MessageAddressTableLookup {
            account_key: fields.pubkey("accountKey")?,
            writable_indexes: indexes_from_value(fields.seq("writableIndexes")?)
                .map_err(|e| e.within("writableIndexes"))?,
            readonly_indexes: indexes_from_value(fields.seq("readonlyIndexes")?)
                .map_err(|e| e.within("readonlyIndexes"))?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageV0 {
    pub header: MessageHeader,
    pub static_account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub compiled_instructions: Vec<CompiledInstruction>,
    pub address_table_lookups: Vec<MessageAddressTableLookup>,
}

impl MessageV0 {
    /// Compile `instructions`, moving every key found in `lookup_tables` out
    /// of the static key table.
    pub fn try_compile(
        payer: &Pubkey,
        instructions: &[Instruction],
        lookup_tables: &[AddressLookupTableAccount],
        recent_blockhash: Hash,
    ) -> Result<Self, CompileError> {
        let mut compiled_keys = CompiledKeys::compile(instructions, *payer);

        let mut address_table_lookups = Vec::new();
        let mut loaded = LoadedAddresses::default();
        for lookup_table in lookup_tables {
            if let Some((lookup, drained)) = compiled_keys.extract_table_lookup(lookup_table)? {
                address_table_lookups.push(lookup);
                loaded.writable.extend(drained.writable);
                loaded.readonly.extend(drained.readonly);
            }
        }

        let (header, static_account_keys) = compiled_keys.get_message_components()?;
        let account_keys = MessageAccountKeys::new(static_account_keys, Some(loaded));
        let compiled_instructions = account_keys.compile_instructions(instructions)?;

        Ok(MessageV0 {
            header,
            static_account_keys: account_keys.static_account_keys,
            recent_blockhash,
            compiled_instructions,
            address_table_lookups,
        })
    }

    pub fn version(&self) -> u8 {
        0
    }

    pub fn num_account_keys_from_lookups(&self) -> usize {
        self.address_table_lookups
            .iter()
            .map(|lookup| lookup.writable_indexes.len() + lookup.readonly_indexes.len())
            .sum()
    }

    /// Full account table. Lookups must be resolvable when the message has any.
    pub fn get_account_keys(&self, source: Option<LookupSource<'_>>) -> Result<MessageAccountKeys, DecompileError> {
        let from_lookups = match source {
            Some(LookupSource::Loaded(loaded)) => {
                if self.num_account_keys_from_lookups() != loaded.len() {
                    return Err(DecompileError::LookupCountMismatch);
                }
                Some(loaded.clone())
            }
            Some(LookupSource::Tables(tables)) => Some(self.resolve_address_table_lookups(tables)?),
            None if !self.address_table_lookups.is_empty() => {
                return Err(DecompileError::UnresolvedLookups)
            }
            None => None,
        };
        Ok(MessageAccountKeys::new(
            self.static_account_keys.clone(),
            from_lookups,
        ))
    }

    pub fn resolve_address_table_lookups(
        &self,
        tables: &[AddressLookupTableAccount],
    ) -> Result<LoadedAddresses, DecompileError> {
        let mut loaded = LoadedAddresses::default();
        for lookup in &self.address_table_lookups {
            let table = tables
                .iter()
                .find(|account| account.key == lookup.account_key)
                .ok_or(DecompileError::MissingLookupTable(lookup.account_key))?;
            let resolve = |index: &u8| {
                table
                    .state
                    .addresses
                    .get(*index as usize)
                    .copied()
                    .ok_or(DecompileError::LookupIndexOutOfRange {
                        table: lookup.account_key,
                        index: *index,
                    })
            };
            for index in &lookup.writable_indexes {
                loaded.writable.push(resolve(index)?);
            }
            for index in &lookup.readonly_indexes {
                loaded.readonly.push(resolve(index)?);
            }
        }
        Ok(loaded)
    }

    pub fn is_account_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    pub fn is_account_writable(&self, index: usize) -> bool {
        let num_static = self.static_account_keys.len();
        if index >= num_static {
            let num_writable_lookups: usize = self
                .address_table_lookups
                .iter()
                .map(|lookup| lookup.writable_indexes.len())
                .sum();
            index - num_static < num_writable_lookups
        } else {
            is_static_writable(&self.header, num_static, index)
        }
    }

    fn to_value(&self) -> Value {
        Value::Struct(
            Fields::new()
                .with("prefix", MESSAGE_VERSION_PREFIX | self.version())
                .with("header", self.header.to_value())
                .with("accountKeys", keys_to_value(&self.static_account_keys))
                .with("recentBlockhash", self.recent_blockhash.to_bytes().to_vec())
                .with(
                    "instructions",
                    Value::Seq(self.compiled_instructions.iter().map(|ix| ix.to_value()).collect()),
                )
                .with(
                    "addressTableLookups",
                    Value::Seq(self.address_table_lookups.iter().map(|l| l.to_value()).collect()),
                ),
        )
    }

    fn from_value(value: &Value) -> Result<Self, WasmSolanaError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let prefix = fields.u64("prefix")? as u8;
        if prefix & MESSAGE_VERSION_PREFIX == 0 {
            return Err(WasmSolanaError::new(
                "Expected versioned message but received legacy message",
            ));
        }
        let version = prefix & VERSION_PREFIX_MASK;
        if version != 0 {
            return Err(WasmSolanaError::new(&format!(
                "Expected versioned message with version 0 but found version {}",
                version
            )));
        }

        let instructions = fields
            .seq("instructions")?
            .iter()
            .enumerate()
            .map(|(i, ix)| {
                CompiledInstruction::from_value(ix)
                    .map_err(|e| e.within(format!("[{}]", i)).within("instructions"))
            })
            .collect::<Result<_, _>>()?;
        let lookups = fields
            .seq("addressTableLookups")?
            .iter()
            .enumerate()
            .map(|(i, lookup)| {
                MessageAddressTableLookup::from_value(lookup)
                    .map_err(|e| e.within(format!("[{}]", i)).within("addressTableLookups"))
            })
            .collect::<Result<_, _>>()?;

        Ok(MessageV0 {
            header: MessageHeader::from_fields(fields)?,
            static_account_keys: keys_from_value(fields.seq("accountKeys")?)
                .map_err(|e| e.within("accountKeys"))?,
            recent_blockhash: hash_from_value(fields, "recentBlockhash")?,
            compiled_instructions: instructions,
            address_table_lookups: lookups,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, LayoutError> {
        MessageSchema::v0().encode_to_vec(&self.to_value())
    }

    /// Decode a v0 message starting at `offset`, returning it with its span.
    pub(crate) fn decode(bytes: &[u8], offset: usize) -> Result<(Self, usize), WasmSolanaError> {
        let (value, used) = MessageSchema::v0().decode_with_span(bytes, offset)?;
        Ok((Self::from_value(&value)?, used))
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, WasmSolanaError> {
        let prefix = *bytes
            .first()
            .ok_or_else(|| LayoutError::out_of_bounds(0, 1, 0))?;
        if prefix & MESSAGE_VERSION_PREFIX == 0 {
            return Err(WasmSolanaError::new(
                "Expected versioned message but received legacy message",
            ));
        }
        let (message, used) = Self::decode(bytes, 0)?;
        if used != bytes.len() {
            return Err(LayoutError::schema(format!("{} trailing bytes after message", bytes.len() - used)).into());
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_lookup_table::AddressLookupTableState;
    use crate::instruction::AccountMeta;

    fn table(key: Pubkey, addresses: Vec<Pubkey>) -> AddressLookupTableAccount {
        AddressLookupTableAccount {
            key,
            state: AddressLookupTableState {
                addresses,
                ..AddressLookupTableState::default()
            },
        }
    }

    struct Fixture {
        payer: Pubkey,
        program: Pubkey,
        writable: Pubkey,
        readonly: Pubkey,
        table: AddressLookupTableAccount,
        message: MessageV0,
    }

    fn fixture() -> Fixture {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let writable = Pubkey::new_unique();
        let readonly = Pubkey::new_unique();
        let table = table(Pubkey::new_unique(), vec![readonly, writable]);
        let ix = Instruction::new(
            program,
            vec![
                AccountMeta::new(payer, true),
                AccountMeta::new(writable, false),
                AccountMeta::new_readonly(readonly, false),
            ],
            vec![1, 2, 3],
        );
        let message = MessageV0::try_compile(
            &payer,
            &[ix],
            std::slice::from_ref(&table),
            Hash::new_from_array([7; 32]),
        )
        .unwrap();
        Fixture {
            payer,
            program,
            writable,
            readonly,
            table,
            message,
        }
    }

    #[test]
    fn test_try_compile_with_lookup() {
        let f = fixture();
        let m = &f.message;
        assert_eq!(m.static_account_keys, vec![f.payer, f.program]);
        assert_eq!(
            m.header,
            MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            }
        );
        assert_eq!(
            m.address_table_lookups,
            vec![MessageAddressTableLookup {
                account_key: f.table.key,
                writable_indexes: vec![1],
                readonly_indexes: vec![0],
            }]
        );
        assert_eq!(m.compiled_instructions[0].program_id_index, 1);
        assert_eq!(m.compiled_instructions[0].accounts, vec![0, 2, 3]);
        assert_eq!(m.num_account_keys_from_lookups(), 2);
    }

    #[test]
    fn test_serialize_round_trip() {
        let f = fixture();
        let bytes = f.message.serialize().unwrap();
        assert_eq!(bytes[0], 0x80);
        assert_eq!(&bytes[1..4], &[1, 0, 1]);
        assert_eq!(MessageV0::deserialize(&bytes).unwrap(), f.message);
    }

    #[test]
    fn test_deserialize_rejects_other_versions() {
        let f = fixture();
        let mut bytes = f.message.serialize().unwrap();
        bytes[0] = 0x81;
        assert!(MessageV0::deserialize(&bytes).is_err());
        bytes[0] = 0x01;
        assert!(MessageV0::deserialize(&bytes).is_err());
    }

    #[test]
    fn test_writable_flags() {
        let f = fixture();
        let flags: Vec<bool> = (0..4).map(|i| f.message.is_account_writable(i)).collect();
        assert_eq!(flags, vec![true, false, true, false]);
        assert!(f.message.is_account_signer(0));
        assert!(!f.message.is_account_signer(1));
    }

    #[test]
    fn test_get_account_keys() {
        let f = fixture();
        let keys = f
            .message
            .get_account_keys(Some(LookupSource::Tables(std::slice::from_ref(&f.table))))
            .unwrap();
        let all: Vec<Pubkey> = keys.iter().copied().collect();
        assert_eq!(all, vec![f.payer, f.program, f.writable, f.readonly]);

        assert_eq!(
            f.message.get_account_keys(None).unwrap_err(),
            DecompileError::UnresolvedLookups
        );

        let short = LoadedAddresses {
            writable: vec![f.writable],
            readonly: vec![],
        };
        assert_eq!(
            f.message
                .get_account_keys(Some(LookupSource::Loaded(&short)))
                .unwrap_err(),
            DecompileError::LookupCountMismatch
        );
    }

    #[test]
    fn test_resolve_errors() {
        let f = fixture();
        assert_eq!(
            f.message.resolve_address_table_lookups(&[]).unwrap_err(),
            DecompileError::MissingLookupTable(f.table.key)
        );
        let truncated = table(f.table.key, vec![f.readonly]);
        assert_eq!(
            f.message
                .resolve_address_table_lookups(&[truncated])
                .unwrap_err(),
            DecompileError::LookupIndexOutOfRange {
                table: f.table.key,
                index: 1
            }
        );
    }
}

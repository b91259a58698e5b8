//! The full account table of a message: static keys followed by keys loaded
//! from address lookup tables.

use crate::address_lookup_table::AddressLookupTableAccount;
use crate::error::CompileError;
use crate::instruction::{CompiledInstruction, Instruction};
use solana_pubkey::Pubkey;
use std::collections::HashMap;

/// Keys a v0 message loads from lookup tables, writable ones first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedAddresses {
    pub writable: Vec<Pubkey>,
    pub readonly: Vec<Pubkey>,
}

impl LoadedAddresses {
    pub fn len(&self) -> usize {
        self.writable.len() + self.readonly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writable.is_empty() && self.readonly.is_empty()
    }
}

/// How the lookup portion of a v0 message's account table is supplied.
#[derive(Debug, Clone, Copy)]
pub enum LookupSource<'a> {
    /// Keys already resolved by the caller.
    Loaded(&'a LoadedAddresses),
    /// Lookup table accounts to resolve the message's lookups against.
    Tables(&'a [AddressLookupTableAccount]),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageAccountKeys {
    pub static_account_keys: Vec<Pubkey>,
    pub account_keys_from_lookups: Option<LoadedAddresses>,
}

impl MessageAccountKeys {
    pub fn new(static_account_keys: Vec<Pubkey>, account_keys_from_lookups: Option<LoadedAddresses>) -> Self {
        MessageAccountKeys {
            static_account_keys,
            account_keys_from_lookups,
        }
    }

    fn key_segments(&self) -> impl Iterator<Item = &[Pubkey]> {
        let lookups = self
            .account_keys_from_lookups
            .iter()
            .flat_map(|loaded| [loaded.writable.as_slice(), loaded.readonly.as_slice()]);
        std::iter::once(self.static_account_keys.as_slice()).chain(lookups)
    }

    pub fn get(&self, mut index: usize) -> Option<&Pubkey> {
        for segment in self.key_segments() {
            if index < segment.len() {
                return segment.get(index);
            }
            index -= segment.len();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.key_segments().map(|segment| segment.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pubkey> {
        self.key_segments().flatten()
    }

    /// Replace every key in `instructions` by its index in this table.
    pub fn compile_instructions(&self, instructions: &[Instruction]) -> Result<Vec<CompiledInstruction>, CompileError> {
        let len = self.len();
        if len > u8::MAX as usize + 1 {
            return Err(CompileError::AccountIndexOverflow(len));
        }

        // Later segments win on duplicates, matching a left-to-right insert.
        let key_index_map: HashMap<&Pubkey, u8> = self
            .iter()
            .enumerate()
            .map(|(index, key)| (key, index as u8))
            .collect();
        let find_key_index = |key: &Pubkey| -> Result<u8, CompileError> {
            key_index_map
                .get(key)
                .copied()
                .ok_or(CompileError::UnknownInstructionKey(*key))
        };

        instructions
            .iter()
            .map(|ix| {
                Ok(CompiledInstruction {
                    program_id_index: find_key_index(&ix.program_id)?,
                    accounts: ix
                        .accounts
                        .iter()
                        .map(|meta| find_key_index(&meta.pubkey))
                        .collect::<Result<_, _>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::AccountMeta;

    fn sample() -> (MessageAccountKeys, Vec<Pubkey>) {
        let keys: Vec<Pubkey> = (0..5).map(|_| Pubkey::new_unique()).collect();
        let account_keys = MessageAccountKeys::new(
            keys[..2].to_vec(),
            Some(LoadedAddresses {
                writable: vec![keys[2]],
                readonly: keys[3..].to_vec(),
            }),
        );
        (account_keys, keys)
    }

    #[test]
    fn test_get_walks_segments() {
        let (account_keys, keys) = sample();
        assert_eq!(account_keys.len(), 5);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(account_keys.get(i), Some(key));
        }
        assert_eq!(account_keys.get(5), None);
        assert_eq!(account_keys.iter().copied().collect::<Vec<_>>(), keys);
    }

    #[test]
    fn test_static_only() {
        let key = Pubkey::new_unique();
        let account_keys = MessageAccountKeys::new(vec![key], None);
        assert_eq!(account_keys.len(), 1);
        assert_eq!(account_keys.get(0), Some(&key));
        assert_eq!(account_keys.get(1), None);
    }

    #[test]
    fn test_compile_instructions() {
        let (account_keys, keys) = sample();
        let ix = Instruction::new(
            keys[1],
            vec![AccountMeta::new(keys[0], true), AccountMeta::new_readonly(keys[4], false)],
            vec![9],
        );
        let compiled = account_keys.compile_instructions(&[ix]).unwrap();
        assert_eq!(compiled, vec![CompiledInstruction::new(1, vec![0, 4], vec![9])]);
    }

    #[test]
    fn test_compile_unknown_key() {
        let (account_keys, _) = sample();
        let stranger = Pubkey::new_unique();
        let ix = Instruction::new(stranger, vec![], vec![]);
        assert_eq!(
            account_keys.compile_instructions(&[ix]).unwrap_err(),
            CompileError::UnknownInstructionKey(stranger)
        );
    }

    #[test]
    fn test_compile_index_overflow() {
        let keys: Vec<Pubkey> = (0..257).map(|_| Pubkey::new_unique()).collect();
        let account_keys = MessageAccountKeys::new(keys, None);
        assert_eq!(
            account_keys.compile_instructions(&[]).unwrap_err(),
            CompileError::AccountIndexOverflow(257)
        );
    }
}

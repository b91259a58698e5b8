//! Deduplicating, partitioning account-key table built from instructions.

use super::account_keys::LoadedAddresses;
use super::v0::MessageAddressTableLookup;
use super::MessageHeader;
use crate::address_lookup_table::AddressLookupTableAccount;
use crate::error::CompileError;
use crate::instruction::Instruction;
use solana_pubkey::Pubkey;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyMeta {
    pub is_signer: bool,
    pub is_writable: bool,
    pub is_invoked: bool,
}

/// Account keys of a set of instructions, with merged flags, in the order
/// they were first seen.
#[derive(Debug, Clone)]
pub struct CompiledKeys {
    payer: Pubkey,
    order: Vec<Pubkey>,
    key_meta_map: HashMap<Pubkey, KeyMeta>,
}

impl CompiledKeys {
    /// Collect the keys of `instructions`. The payer comes first and is always
    /// a writable signer; flags only ever widen.
    pub fn compile(instructions: &[Instruction], payer: Pubkey) -> Self {
        let mut keys = CompiledKeys {
            payer,
            order: Vec::new(),
            key_meta_map: HashMap::new(),
        };
        let payer_meta = keys.entry(payer);
        payer_meta.is_signer = true;
        payer_meta.is_writable = true;

        for ix in instructions {
            keys.entry(ix.program_id).is_invoked = true;
            for account_meta in &ix.accounts {
                let meta = keys.entry(account_meta.pubkey);
                meta.is_signer |= account_meta.is_signer;
                meta.is_writable |= account_meta.is_writable;
            }
        }
        keys
    }

    fn entry(&mut self, key: Pubkey) -> &mut KeyMeta {
        if !self.key_meta_map.contains_key(&key) {
            self.order.push(key);
        }
        self.key_meta_map.entry(key).or_default()
    }

    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: &Pubkey) -> Option<&KeyMeta> {
        self.key_meta_map.get(key)
    }

    /// Promote `key` to a signer. Returns `false` when the key was already one.
    pub fn mark_signer(&mut self, key: &Pubkey) -> Result<bool, CompileError> {
        let meta = self
            .key_meta_map
            .get_mut(key)
            .ok_or(CompileError::UnknownSigner(*key))?;
        let promoted = !meta.is_signer;
        meta.is_signer = true;
        Ok(promoted)
    }

    fn partition(&self, is_signer: bool, is_writable: bool) -> impl Iterator<Item = &Pubkey> {
        self.order.iter().filter(move |key| {
            self.key_meta_map
                .get(*key)
                .is_some_and(|m| m.is_signer == is_signer && m.is_writable == is_writable)
        })
    }

    /// Header plus the static key table: writable signers, readonly signers,
    /// writable non-signers, readonly non-signers.
    pub fn get_message_components(&self) -> Result<(MessageHeader, Vec<Pubkey>), CompileError> {
        if self.order.len() > u8::MAX as usize + 1 {
            return Err(CompileError::StaticKeysOverflow(self.order.len()));
        }

        let writable_signers: Vec<Pubkey> = self.partition(true, true).copied().collect();
        let readonly_signers: Vec<Pubkey> = self.partition(true, false).copied().collect();
        let writable_non_signers: Vec<Pubkey> = self.partition(false, true).copied().collect();
        let readonly_non_signers: Vec<Pubkey> = self.partition(false, false).copied().collect();

        let count = |n: usize| u8::try_from(n).map_err(|_| CompileError::HeaderCountOverflow(n));
        let header = MessageHeader {
            num_required_signatures: count(writable_signers.len() + readonly_signers.len())?,
            num_readonly_signed_accounts: count(readonly_signers.len())?,
            num_readonly_unsigned_accounts: count(readonly_non_signers.len())?,
        };

        let first = writable_signers.first().ok_or(CompileError::MissingFeePayer)?;
        if *first != self.payer {
            return Err(CompileError::FeePayerMismatch {
                expected: self.payer,
                found: *first,
            });
        }

        let static_account_keys = writable_signers
            .into_iter()
            .chain(readonly_signers)
            .chain(writable_non_signers)
            .chain(readonly_non_signers)
            .collect();
        Ok((header, static_account_keys))
    }

    /// Move keys that `lookup_table` holds out of the static table.
    ///
    /// Only non-signer keys that are not invoked as programs qualify. Returns
    /// `None` when nothing was found in the table.
    pub fn extract_table_lookup(
        &mut self,
        lookup_table: &AddressLookupTableAccount,
    ) -> Result<Option<(MessageAddressTableLookup, LoadedAddresses)>, CompileError> {
        let addresses = &lookup_table.state.addresses;
        let (writable_indexes, drained_writable) = self.drain_keys_found_in_lookup_table(
            &lookup_table.key,
            addresses,
            |m| !m.is_signer && !m.is_invoked && m.is_writable,
        )?;
        let (readonly_indexes, drained_readonly) = self.drain_keys_found_in_lookup_table(
            &lookup_table.key,
            addresses,
            |m| !m.is_signer && !m.is_invoked && !m.is_writable,
        )?;

        if writable_indexes.is_empty() && readonly_indexes.is_empty() {
            return Ok(None);
        }
        Ok(Some((
            MessageAddressTableLookup {
                account_key: lookup_table.key,
                writable_indexes,
                readonly_indexes,
            },
            LoadedAddresses {
                writable: drained_writable,
                readonly: drained_readonly,
            },
        )))
    }

    fn drain_keys_found_in_lookup_table(
        &mut self,
        table_key: &Pubkey,
        lookup_table_entries: &[Pubkey],
        key_meta_filter: impl Fn(&KeyMeta) -> bool,
    ) -> Result<(Vec<u8>, Vec<Pubkey>), CompileError> {
        let mut lookup_table_indexes = Vec::new();
        let mut drained_keys = Vec::new();

        for key in &self.order {
            let Some(meta) = self.key_meta_map.get(key) else {
                continue;
            };
            if !key_meta_filter(meta) {
                continue;
            }
            if let Some(index) = lookup_table_entries.iter().position(|entry| entry == key) {
                let index = u8::try_from(index).map_err(|_| {
                    CompileError::AddressTableLookupIndexOverflow {
                        table: *table_key,
                        index,
                    }
                })?;
                lookup_table_indexes.push(index);
                drained_keys.push(*key);
            }
        }

        for key in &drained_keys {
            self.key_meta_map.remove(key);
        }
        self.order.retain(|key| self.key_meta_map.contains_key(key));
        Ok((lookup_table_indexes, drained_keys))
    }
}

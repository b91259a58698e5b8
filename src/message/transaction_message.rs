//! Uncompiled messages: a payer, instructions and a blockhash.

use super::account_keys::LookupSource;
use super::legacy::Message;
use super::v0::MessageV0;
use super::versions::VersionedMessage;
use crate::address_lookup_table::AddressLookupTableAccount;
use crate::error::{CompileError, DecompileError};
use crate::instruction::{AccountMeta, Instruction};
use solana_hash::Hash;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionMessage {
    pub payer_key: Pubkey,
    pub instructions: Vec<Instruction>,
    pub recent_blockhash: Hash,
}

impl TransactionMessage {
    pub fn new(payer_key: Pubkey, instructions: Vec<Instruction>, recent_blockhash: Hash) -> Self {
        TransactionMessage {
            payer_key,
            instructions,
            recent_blockhash,
        }
    }

    /// Rebuild instructions from a compiled message.
    ///
    /// Signer and writable flags come from each index's position relative to
    /// the header counts. v0 messages with lookups need `source`.
    pub fn decompile(
        message: &VersionedMessage,
        source: Option<LookupSource<'_>>,
    ) -> Result<Self, DecompileError> {
        let header = message.header();
        let num_required_signatures = header.num_required_signatures as usize;
        let num_readonly_signed = header.num_readonly_signed_accounts as usize;
        let num_readonly_unsigned = header.num_readonly_unsigned_accounts as usize;
        let num_static = message.static_account_keys().len();

        let num_writable_signed = num_required_signatures
            .checked_sub(num_readonly_signed)
            .filter(|n| *n > 0)
            .ok_or(DecompileError::InvalidHeader)?;
        let num_writable_unsigned = num_static
            .checked_sub(num_required_signatures)
            .and_then(|n| n.checked_sub(num_readonly_unsigned))
            .ok_or(DecompileError::InvalidHeader)?;

        let account_keys = message.get_account_keys(source)?;
        let payer_key = *account_keys.get(0).ok_or(DecompileError::NoAccountKeys)?;
        let num_lookup_writable = account_keys
            .account_keys_from_lookups
            .as_ref()
            .map_or(0, |loaded| loaded.writable.len());

        let mut instructions = Vec::with_capacity(message.compiled_instructions().len());
        for compiled in message.compiled_instructions() {
            let mut accounts = Vec::with_capacity(compiled.accounts.len());
            for key_index in &compiled.accounts {
                let index = *key_index as usize;
                let pubkey = *account_keys
                    .get(index)
                    .ok_or(DecompileError::AccountIndexOutOfRange(*key_index))?;
                let is_signer = index < num_required_signatures;
                let is_writable = if is_signer {
                    index < num_writable_signed
                } else if index < num_static {
                    index - num_required_signatures < num_writable_unsigned
                } else {
                    index - num_static < num_lookup_writable
                };
                accounts.push(AccountMeta {
                    pubkey,
                    is_signer,
                    is_writable,
                });
            }
            let program_id = *account_keys
                .get(compiled.program_id_index as usize)
                .ok_or(DecompileError::ProgramIdIndexOutOfRange(compiled.program_id_index))?;
            instructions.push(Instruction {
                program_id,
                accounts,
                data: compiled.data.clone(),
            });
        }

        Ok(TransactionMessage {
            payer_key,
            instructions,
            recent_blockhash: *message.recent_blockhash(),
        })
    }

    pub fn compile_to_legacy_message(&self) -> Result<Message, CompileError> {
        Message::compile(&self.payer_key, &self.instructions, self.recent_blockhash)
    }

    pub fn compile_to_v0_message(
        &self,
        lookup_tables: &[AddressLookupTableAccount],
    ) -> Result<MessageV0, CompileError> {
        MessageV0::try_compile(
            &self.payer_key,
            &self.instructions,
            lookup_tables,
            self.recent_blockhash,
        )
    }
}

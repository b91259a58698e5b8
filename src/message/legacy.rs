//! Legacy (unversioned) messages.

use super::account_keys::MessageAccountKeys;
use super::compiled_keys::CompiledKeys;
use super::{
    decode_exact, hash_from_value, is_static_writable, keys_from_value, keys_to_value,
    MessageHeader, MessageSchema, MESSAGE_VERSION_PREFIX,
};
use crate::error::{CompileError, LayoutError, WasmSolanaError};
use crate::instruction::{CompiledInstruction, Instruction};
use crate::layout::{Fields, Value};
use solana_hash::Hash;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    pub fn compile(
        payer: &Pubkey,
        instructions: &[Instruction],
        recent_blockhash: Hash,
    ) -> Result<Self, CompileError> {
        let compiled_keys = CompiledKeys::compile(instructions, *payer);
        Self::from_compiled_keys(compiled_keys, instructions, recent_blockhash)
    }

    /// Finish compilation from an already collected key table.
    pub(crate) fn from_compiled_keys(
        compiled_keys: CompiledKeys,
        instructions: &[Instruction],
        recent_blockhash: Hash,
    ) -> Result<Self, CompileError> {
        let (header, static_account_keys) = compiled_keys.get_message_components()?;
        let account_keys = MessageAccountKeys::new(static_account_keys, None);
        let instructions = account_keys.compile_instructions(instructions)?;
        Ok(Message {
            header,
            account_keys: account_keys.static_account_keys,
            recent_blockhash,
            instructions,
        })
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    pub fn get_account_keys(&self) -> MessageAccountKeys {
        MessageAccountKeys::new(self.account_keys.clone(), None)
    }

    pub fn is_account_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    pub fn is_account_writable(&self, index: usize) -> bool {
        index < self.account_keys.len()
            && is_static_writable(&self.header, self.account_keys.len(), index)
    }

    pub fn is_program_id(&self, index: usize) -> bool {
        self.instructions
            .iter()
            .any(|ix| ix.program_id_index as usize == index)
    }

    pub fn program_ids(&self) -> Vec<Pubkey> {
        let mut ids: Vec<Pubkey> = Vec::new();
        for ix in &self.instructions {
            if let Some(key) = self.account_keys.get(ix.program_id_index as usize) {
                if !ids.contains(key) {
                    ids.push(*key);
                }
            }
        }
        ids
    }

    pub fn non_program_ids(&self) -> Vec<Pubkey> {
        self.account_keys
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.is_program_id(*index))
            .map(|(_, key)| *key)
            .collect()
    }

    /// Public keys that must sign, in signature-slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        let count = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..count]
    }

    fn to_value(&self) -> Value {
        Value::Struct(
            Fields::new()
                .with("header", self.header.to_value())
                .with("accountKeys", keys_to_value(&self.account_keys))
                .with("recentBlockhash", self.recent_blockhash.to_bytes().to_vec())
                .with(
                    "instructions",
                    Value::Seq(self.instructions.iter().map(|ix| ix.to_value()).collect()),
                ),
        )
    }

    fn from_value(value: &Value) -> Result<Self, LayoutError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let instructions = fields
            .seq("instructions")?
            .iter()
            .enumerate()
            .map(|(i, ix)| {
                CompiledInstruction::from_value(ix)
                    .map_err(|e| e.within(format!("[{}]", i)).within("instructions"))
            })
            .collect::<Result<_, _>>()?;
        Ok(Message {
            header: MessageHeader::from_fields(fields)?,
            account_keys: keys_from_value(fields.seq("accountKeys")?)
                .map_err(|e| e.within("accountKeys"))?,
            recent_blockhash: hash_from_value(fields, "recentBlockhash")?,
            instructions,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, LayoutError> {
        MessageSchema::legacy().encode_to_vec(&self.to_value())
    }

    pub(crate) fn decode(bytes: &[u8], offset: usize) -> Result<(Self, usize), LayoutError> {
        let (value, used) = MessageSchema::legacy().decode_with_span(bytes, offset)?;
        Ok((Self::from_value(&value)?, used))
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, WasmSolanaError> {
        let prefix = *bytes
            .first()
            .ok_or_else(|| LayoutError::out_of_bounds(0, 1, 0))?;
        if prefix & MESSAGE_VERSION_PREFIX != 0 {
            return Err(WasmSolanaError::new(
                "Versioned messages must be deserialized with VersionedMessage::deserialize",
            ));
        }
        let value = decode_exact(MessageSchema::legacy(), bytes)?;
        Ok(Self::from_value(&value)?)
    }
}

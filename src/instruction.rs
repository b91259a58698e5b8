//! Instructions in their uncompiled (key-based) and compiled (index-based) forms.

use crate::error::LayoutError;
use crate::layout::{Fields, Value};
use solana_pubkey::Pubkey;

/// One account referenced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        AccountMeta {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        AccountMeta {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: Pubkey, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Instruction {
            program_id,
            accounts,
            data,
        }
    }
}

/// An instruction whose program id and accounts are indexes into a message's
/// account table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

fn indexes_to_value(indexes: &[u8]) -> Value {
    Value::Seq(indexes.iter().map(|i| Value::UInt(*i as u64)).collect())
}

pub(crate) fn indexes_from_value(items: &[Value]) -> Result<Vec<u8>, LayoutError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| item.mismatch("account index").within(format!("[{}]", i)))
        })
        .collect()
}

impl CompiledInstruction {
    pub fn new(program_id_index: u8, accounts: Vec<u8>, data: Vec<u8>) -> Self {
        CompiledInstruction {
            program_id_index,
            accounts,
            data,
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Struct(
            Fields::new()
                .with("programIdIndex", self.program_id_index)
                .with("accounts", indexes_to_value(&self.accounts))
                .with("data", self.data.clone()),
        )
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, LayoutError> {
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let program_id_index = u8::try_from(fields.u64("programIdIndex")?)
            .map_err(|_| LayoutError::schema("index exceeds u8").within("programIdIndex"))?;
        let accounts =
            indexes_from_value(fields.seq("accounts")?).map_err(|e| e.within("accounts"))?;
        Ok(CompiledInstruction {
            program_id_index,
            accounts,
            data: fields.bytes("data")?.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_meta_constructors() {
        let key = Pubkey::new_unique();
        let meta = AccountMeta::new(key, true);
        assert!(meta.is_signer && meta.is_writable);
        let meta = AccountMeta::new_readonly(key, false);
        assert!(!meta.is_signer && !meta.is_writable);
    }

    #[test]
    fn test_compiled_instruction_value_round_trip() {
        let ix = CompiledInstruction::new(2, vec![0, 1], vec![2, 0, 0, 0]);
        assert_eq!(CompiledInstruction::from_value(&ix.to_value()).unwrap(), ix);
    }

    #[test]
    fn test_index_out_of_u8_range() {
        let value = Value::Struct(
            Fields::new()
                .with("programIdIndex", 0u8)
                .with("accounts", Value::Seq(vec![Value::UInt(256)]))
                .with("data", Vec::<u8>::new()),
        );
        let err = CompiledInstruction::from_value(&value).unwrap_err();
        assert_eq!(err.path().to_string(), "accounts[0]");
    }
}

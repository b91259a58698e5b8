//! Versioned transaction building from raw MessageV0 data.
//!
//! Used when the caller already holds a compiled v0 message (index-based
//! instructions plus lookup table references), e.g. transactions produced by
//! a third party that only need serializing. No instruction compilation
//! happens here.

use super::types::RawVersionedTransactionData;
use crate::error::WasmSolanaError;
use crate::instruction::CompiledInstruction;
use crate::message::{MessageAddressTableLookup, MessageHeader, MessageV0, VersionedMessage};
use crate::versioned::VersionedTransaction;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use std::str::FromStr;

/// Build a versioned transaction directly from raw MessageV0 data.
///
/// Returns serialized versioned transaction bytes with one zero-filled
/// signature slot per required signer.
pub fn build_from_raw_versioned_data(
    data: &RawVersionedTransactionData,
) -> Result<Vec<u8>, WasmSolanaError> {
    let static_account_keys: Vec<Pubkey> = data
        .static_account_keys
        .iter()
        .map(|key| {
            key.parse().map_err(|e| {
                WasmSolanaError::new(&format!("Invalid static account key '{}': {}", key, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let recent_blockhash = Hash::from_str(&data.recent_blockhash)
        .map_err(|e| WasmSolanaError::new(&format!("Invalid blockhash: {}", e)))?;

    let compiled_instructions = data
        .versioned_instructions
        .iter()
        .map(|ix| {
            let instruction_data = bs58::decode(&ix.data)
                .into_vec()
                .map_err(|e| WasmSolanaError::new(&format!("Invalid instruction data: {}", e)))?;
            Ok(CompiledInstruction::new(
                ix.program_id_index,
                ix.account_key_indexes.clone(),
                instruction_data,
            ))
        })
        .collect::<Result<Vec<_>, WasmSolanaError>>()?;

    let address_table_lookups = data
        .address_lookup_tables
        .iter()
        .map(|alt| {
            let account_key: Pubkey = alt.account_key.parse().map_err(|e| {
                WasmSolanaError::new(&format!("Invalid ALT account key: {}", e))
            })?;
            Ok(MessageAddressTableLookup {
                account_key,
                writable_indexes: alt.writable_indexes.clone(),
                readonly_indexes: alt.readonly_indexes.clone(),
            })
        })
        .collect::<Result<Vec<_>, WasmSolanaError>>()?;

    let message = MessageV0 {
        header: MessageHeader {
            num_required_signatures: data.message_header.num_required_signatures,
            num_readonly_signed_accounts: data.message_header.num_readonly_signed_accounts,
            num_readonly_unsigned_accounts: data.message_header.num_readonly_unsigned_accounts,
        },
        static_account_keys,
        recent_blockhash,
        compiled_instructions,
        address_table_lookups,
    };

    VersionedTransaction::new(VersionedMessage::V0(message), None)?.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::{AddressLookupTable, RawMessageHeader, VersionedInstruction};

    fn raw_data(address_lookup_tables: Vec<AddressLookupTable>) -> RawVersionedTransactionData {
        RawVersionedTransactionData {
            static_account_keys: vec![
                "35aKHPPJqb7qVNAaUb8DQLRC3Njp5RJZJSQM3v2PZhM7".to_string(),
                "ESuE8KSzSHBRCtgDwauL7vCR2ohxrWXf8rw75vVbNFvL".to_string(),
                "11111111111111111111111111111111".to_string(),
            ],
            address_lookup_tables,
            versioned_instructions: vec![VersionedInstruction {
                program_id_index: 2,
                account_key_indexes: vec![0, 1],
                data: "3Bxs4ThwQbE4vyj".to_string(),
            }],
            message_header: RawMessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            },
            recent_blockhash: "GHtXQBsoZHVnNFa9YevAzFr17DJjgHXk3ycTKD5xD3Zi".to_string(),
        }
    }

    #[test]
    fn test_build_from_raw_versioned_data() {
        let data = raw_data(vec![]);
        let bytes = build_from_raw_versioned_data(&data).unwrap();

        let tx = VersionedTransaction::from_bytes(&bytes).unwrap();
        assert!(tx.is_versioned());
        assert_eq!(tx.num_signatures(), 1);
        assert_eq!(tx.static_account_keys(), data.static_account_keys);
        assert_eq!(tx.blockhash_string(), data.recent_blockhash);
        let compiled = &tx.message.compiled_instructions()[0];
        assert_eq!(compiled.program_id_index, 2);
        assert_eq!(compiled.data, bs58::decode("3Bxs4ThwQbE4vyj").into_vec().unwrap());
    }

    #[test]
    fn test_build_with_alts() {
        let data = raw_data(vec![AddressLookupTable {
            account_key: "2immgwYNHBbyVQKVGCEkgWpi53bLwWNRMB5G2nbgYV17".to_string(),
            writable_indexes: vec![0, 16],
            readonly_indexes: vec![1, 4],
        }]);
        let bytes = build_from_raw_versioned_data(&data).unwrap();

        let tx = VersionedTransaction::from_bytes(&bytes).unwrap();
        let lookups = tx.address_lookup_tables();
        assert_eq!(lookups.len(), 1);
        assert_eq!(lookups[0].writable_indexes, vec![0, 16]);
        assert_eq!(lookups[0].readonly_indexes, vec![1, 4]);
    }

    #[test]
    fn test_invalid_instruction_data() {
        let mut data = raw_data(vec![]);
        data.versioned_instructions[0].data = "0OIl".to_string();
        assert!(build_from_raw_versioned_data(&data).is_err());
    }
}

//! High-level transaction parser.
//!
//! Provides `parse_transaction`, which deserializes transaction bytes,
//! decompiles the message and decodes every instruction into semantic types.
//!
//! Instruction combining (e.g. CreateAccount + NonceInitialize) is left to
//! the consumer; this parser returns one entry per on-chain instruction.

use crate::address_lookup_table::AddressLookupTableAccount;
use crate::error::WasmSolanaError;
use crate::instructions::{self, decode_instruction, InstructionContext, ParsedInstruction};
use crate::js_obj;
use crate::message::{LookupSource, TransactionMessage, TxVersion};
use crate::versioned::VersionedTransaction;
use crate::wasm::try_into_js_value::{JsConversionError, TryIntoJsValue};
use solana_signature::Signature;
use wasm_bindgen::JsValue;

/// A fully parsed Solana transaction with decoded instructions.
#[derive(Debug, Clone)]
pub struct ParsedTransaction {
    pub version: TxVersion,

    /// The fee payer address (base58).
    pub fee_payer: String,

    /// Number of required signatures.
    pub num_signatures: u8,

    /// The blockhash or nonce (base58).
    pub nonce: String,

    /// If this is a durable nonce transaction, contains the nonce info.
    pub durable_nonce: Option<DurableNonce>,

    /// All decoded instructions.
    pub instructions_data: Vec<ParsedInstruction>,

    /// Static account keys followed by keys loaded from lookup tables (base58).
    pub account_keys: Vec<String>,

    /// All signatures (base58 strings). Unsigned slots are empty strings.
    pub signatures: Vec<String>,
}

/// Durable nonce information for nonce-based transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurableNonce {
    /// The nonce account address (base58).
    pub wallet_nonce_address: String,

    /// The nonce authority address (base58).
    pub auth_wallet_address: String,
}

impl TryIntoJsValue for DurableNonce {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "walletNonceAddress" => self.wallet_nonce_address,
            "authWalletAddress" => self.auth_wallet_address
        )
    }
}

impl TryIntoJsValue for ParsedTransaction {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "version" => self.version.to_string(),
            "feePayer" => self.fee_payer,
            "numSignatures" => self.num_signatures,
            "nonce" => self.nonce,
            "durableNonce" => self.durable_nonce,
            "instructionsData" => self.instructions_data,
            "accountKeys" => self.account_keys,
            "signatures" => self.signatures
        )
    }
}

/// Parse a serialized Solana transaction into structured data.
///
/// v0 transactions that load accounts from lookup tables need the tables;
/// use [`parse_transaction_with_lookup_tables`] for those.
pub fn parse_transaction(bytes: &[u8]) -> Result<ParsedTransaction, WasmSolanaError> {
    parse_transaction_with_lookup_tables(bytes, &[])
}

pub fn parse_transaction_with_lookup_tables(
    bytes: &[u8],
    lookup_tables: &[AddressLookupTableAccount],
) -> Result<ParsedTransaction, WasmSolanaError> {
    let tx = VersionedTransaction::from_bytes(bytes)?;
    let message = &tx.message;

    let source = (!message.address_table_lookups().is_empty())
        .then_some(LookupSource::Tables(lookup_tables));
    let decompiled = TransactionMessage::decompile(message, source)?;
    let account_keys: Vec<String> = message
        .get_account_keys(source)?
        .iter()
        .map(|k| k.to_string())
        .collect();

    let mut instructions_data = Vec::with_capacity(decompiled.instructions.len());
    let mut durable_nonce = None;
    for (idx, instruction) in decompiled.instructions.iter().enumerate() {
        let program_id = instruction.program_id.to_string();
        let accounts: Vec<instructions::AccountMeta> = instruction
            .accounts
            .iter()
            .map(|meta| instructions::AccountMeta {
                pubkey: meta.pubkey.to_string(),
                is_signer: meta.is_signer,
                is_writable: meta.is_writable,
            })
            .collect();

        let parsed = decode_instruction(InstructionContext {
            program_id: &program_id,
            accounts: &accounts,
            data: &instruction.data,
        });

        // A leading NonceAdvance marks a durable nonce transaction.
        if idx == 0 {
            if let ParsedInstruction::NonceAdvance(ref params) = parsed {
                durable_nonce = Some(DurableNonce {
                    wallet_nonce_address: params.wallet_nonce_address.clone(),
                    auth_wallet_address: params.auth_wallet_address.clone(),
                });
            }
        }
        instructions_data.push(parsed);
    }

    let signatures = tx
        .signatures
        .iter()
        .map(|s| {
            if *s == Signature::default() {
                String::new()
            } else {
                s.to_string()
            }
        })
        .collect();

    Ok(ParsedTransaction {
        version: tx.version(),
        fee_payer: decompiled.payer_key.to_string(),
        num_signatures: message.header().num_required_signatures,
        nonce: message.recent_blockhash().to_string(),
        durable_nonce,
        instructions_data,
        account_keys,
        signatures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_lookup_table::AddressLookupTableState;
    use crate::instructions::{compute_budget, memo, system};
    use crate::message::{MessageV0, VersionedMessage};
    use crate::transaction::{NonceInformation, SerializeConfig, Transaction};
    use base64::prelude::*;
    use solana_hash::Hash;
    use solana_keypair::Keypair;
    use solana_pubkey::Pubkey;
    use solana_signer::Signer;

    // Test transaction from @solana/web3.js - a simple SOL transfer
    const TEST_TX_BASE64: &str = "AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABAAEDFVMqpim7tqEi2XL8R6KKkP0DYJvY3eiRXLlL1P9EjYgXKQC+k0FKnqyC4AZGJR7OhJXfpPP3NHOhS8t/6G7bLAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA/1c7Oaj3RbyLIjU0/ZPpsmVfVUWAzc8g36fK5g6A0JoBAgIAAQwCAAAAoIYBAAAAAAA=";

    #[test]
    fn test_parse_transfer_transaction() {
        let bytes = BASE64_STANDARD.decode(TEST_TX_BASE64).unwrap();
        let parsed = parse_transaction(&bytes).unwrap();

        assert_eq!(parsed.version, TxVersion::Legacy);
        assert_eq!(parsed.num_signatures, 1);
        assert_eq!(parsed.fee_payer, parsed.account_keys[0]);
        assert_eq!(parsed.signatures, vec![String::new()]);
        assert!(parsed.durable_nonce.is_none());
        assert_eq!(parsed.instructions_data.len(), 1);

        match &parsed.instructions_data[0] {
            ParsedInstruction::Transfer(params) => {
                assert_eq!(params.amount, 100000);
                assert_eq!(params.from_address, parsed.fee_payer);
                assert_eq!(params.to_address, parsed.account_keys[1]);
            }
            other => panic!("Expected Transfer instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_transaction(&[0, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_parse_durable_nonce_transaction() {
        let payer = Keypair::new();
        let nonce_account = Pubkey::new_unique();
        let mut tx = Transaction::with_nonce(
            payer.pubkey(),
            NonceInformation {
                nonce: Hash::new_from_array([3; 32]),
                nonce_instruction: system::advance_nonce_account(&nonce_account, &payer.pubkey())
                    .unwrap(),
            },
        );
        tx.add(compute_budget::set_compute_unit_price(5_000).unwrap());
        tx.add(memo::build_memo("payout", &[]));
        tx.sign(&[&payer]).unwrap();
        let bytes = tx.serialize(SerializeConfig::default()).unwrap();

        let parsed = parse_transaction(&bytes).unwrap();
        assert_eq!(parsed.nonce, Hash::new_from_array([3; 32]).to_string());
        assert_eq!(
            parsed.durable_nonce,
            Some(DurableNonce {
                wallet_nonce_address: nonce_account.to_string(),
                auth_wallet_address: payer.pubkey().to_string(),
            })
        );
        assert_eq!(parsed.instructions_data.len(), 3);
        assert!(matches!(
            parsed.instructions_data[1],
            ParsedInstruction::SetPriorityFee(ref p) if p.fee == 5_000
        ));
        assert!(matches!(
            parsed.instructions_data[2],
            ParsedInstruction::Memo(ref p) if p.memo == "payout"
        ));
        assert!(!parsed.signatures[0].is_empty());
    }

    #[test]
    fn test_parse_v0_with_lookup_tables() {
        let payer = Keypair::new();
        let dest = Pubkey::new_unique();
        let table = AddressLookupTableAccount::new(
            Pubkey::new_unique(),
            AddressLookupTableState {
                addresses: vec![dest],
                ..Default::default()
            },
        );
        let ix = system::transfer(&payer.pubkey(), &dest, 42).unwrap();
        let message = MessageV0::try_compile(
            &payer.pubkey(),
            &[ix],
            std::slice::from_ref(&table),
            Hash::new_from_array([4; 32]),
        )
        .unwrap();
        let tx = VersionedTransaction::new(VersionedMessage::V0(message), None).unwrap();
        let bytes = tx.to_bytes().unwrap();

        assert!(parse_transaction(&bytes).is_err());

        let parsed = parse_transaction_with_lookup_tables(&bytes, &[table]).unwrap();
        assert_eq!(parsed.version, TxVersion::V0);
        assert_eq!(parsed.account_keys.last(), Some(&dest.to_string()));
        assert_eq!(
            parsed.instructions_data,
            vec![ParsedInstruction::Transfer(instructions::TransferParams {
                from_address: payer.pubkey().to_string(),
                to_address: dest.to_string(),
                amount: 42,
            })]
        );
    }
}

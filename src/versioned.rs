//! Versioned transaction support for Solana.
//!
//! This module handles both legacy and versioned (MessageV0) transactions,
//! providing a unified interface for parsing and signing.
//!
//! # Transaction Versions
//!
//! - **Legacy**: Original transaction format with all accounts inline
//! - **V0**: Versioned format with Address Lookup Tables (ALTs) for account compression
//!
//! # Wire Format Detection
//!
//! Both formats start with the compact-u16 signature count and signatures.
//! The first message byte then tells them apart: versioned messages have the
//! high bit set (0x80 = version 0).

use crate::error::WasmSolanaError;
use crate::layout::{shortvec, Value};
use crate::message::{MessageSchema, VersionedMessage, MESSAGE_VERSION_PREFIX, SIGNATURE_LENGTH};
use crate::transaction::decode_signatures;
use base64::prelude::*;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use std::str::FromStr;

pub use crate::message::TxVersion;

/// Address Lookup Table data extracted from versioned transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLookupTableData {
    /// The lookup table account address (base58)
    pub account_key: String,
    /// Indices of writable accounts in the lookup table
    pub writable_indexes: Vec<u8>,
    /// Indices of readonly accounts in the lookup table
    pub readonly_indexes: Vec<u8>,
}

/// Detect the transaction version from raw bytes.
///
/// Skips the signature array and inspects the first message byte. Bytes too
/// short to contain a message are reported as legacy and fail later with a
/// proper error.
pub fn detect_transaction_version(bytes: &[u8]) -> TxVersion {
    let Ok((count, len_size)) = shortvec::decode_length(bytes, 0) else {
        return TxVersion::Legacy;
    };
    match bytes.get(len_size + count * SIGNATURE_LENGTH) {
        Some(prefix) if prefix & MESSAGE_VERSION_PREFIX != 0 => TxVersion::V0,
        _ => TxVersion::Legacy,
    }
}

/// A compiled message plus one signature slot per required signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedTransaction {
    pub signatures: Vec<Signature>,
    pub message: VersionedMessage,
}

impl VersionedTransaction {
    /// Wrap `message`. Without `signatures`, every required signer gets a
    /// zero-filled slot.
    pub fn new(
        message: VersionedMessage,
        signatures: Option<Vec<Signature>>,
    ) -> Result<Self, WasmSolanaError> {
        let num_required = message.header().num_required_signatures as usize;
        let signatures = match signatures {
            Some(signatures) => {
                if signatures.len() != num_required {
                    return Err(WasmSolanaError::new(&format!(
                        "Expected {} signatures, got {}",
                        num_required,
                        signatures.len()
                    )));
                }
                signatures
            }
            None => vec![Signature::default(); num_required],
        };
        Ok(VersionedTransaction { signatures, message })
    }

    /// Deserialize a transaction from raw bytes (handles both legacy and versioned).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WasmSolanaError> {
        let (signatures, offset) = decode_signatures(bytes)?;
        let (message, used) = VersionedMessage::decode(bytes, offset).map_err(|e| {
            WasmSolanaError::new(&format!("Failed to deserialize versioned transaction: {}", e))
        })?;
        if offset + used != bytes.len() {
            return Err(WasmSolanaError::new(&format!(
                "Failed to deserialize versioned transaction: {} trailing bytes",
                bytes.len() - offset - used
            )));
        }
        Ok(VersionedTransaction { signatures, message })
    }

    pub fn from_base64(encoded: &str) -> Result<Self, WasmSolanaError> {
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| WasmSolanaError::new(&format!("Invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize transaction to bytes (wire format).
    pub fn to_bytes(&self) -> Result<Vec<u8>, WasmSolanaError> {
        let signatures = Value::Seq(
            self.signatures
                .iter()
                .map(|s| Value::Bytes(s.as_ref().to_vec()))
                .collect(),
        );
        let mut wire = MessageSchema::signatures().encode_to_vec(&signatures)?;
        wire.extend_from_slice(&self.message.serialize()?);
        Ok(wire)
    }

    pub fn to_base64(&self) -> Result<String, WasmSolanaError> {
        Ok(BASE64_STANDARD.encode(self.to_bytes()?))
    }

    /// Sign with each of `signers`. Every signer must be a required signer
    /// of the message.
    pub fn sign(&mut self, signers: &[&dyn Signer]) -> Result<(), WasmSolanaError> {
        let message_data = self.signable_payload()?;
        let signer_keys = self.message.signer_keys().to_vec();
        for signer in signers {
            let pubkey = signer
                .try_pubkey()
                .map_err(|e| WasmSolanaError::new(&format!("Signer has no public key: {}", e)))?;
            let index = signer_keys
                .iter()
                .position(|key| *key == pubkey)
                .ok_or_else(|| WasmSolanaError::signer(pubkey, "Cannot sign with non signer key"))?;
            let signature = signer
                .try_sign_message(&message_data)
                .map_err(|e| WasmSolanaError::signer(pubkey, &e.to_string()))?;
            self.set_signature_at(index, signature);
        }
        Ok(())
    }

    /// Add a signature for a given public key.
    pub fn add_signature(&mut self, pubkey: &str, signature: &[u8]) -> Result<(), WasmSolanaError> {
        let bytes = <[u8; SIGNATURE_LENGTH]>::try_from(signature).map_err(|_| {
            WasmSolanaError::new(&format!(
                "Invalid signature length: expected 64 bytes, got {}",
                signature.len()
            ))
        })?;
        let index = self
            .signer_index(pubkey)
            .ok_or_else(|| WasmSolanaError::signer(pubkey, "unknown signer"))?;
        self.set_signature_at(index, Signature::from(bytes));
        Ok(())
    }

    fn set_signature_at(&mut self, index: usize, signature: Signature) {
        let num_signers = self.message.header().num_required_signatures as usize;
        if self.signatures.len() < num_signers {
            self.signatures.resize(num_signers, Signature::default());
        }
        self.signatures[index] = signature;
    }

    /// True when every required signer has a valid signature.
    pub fn verify_signatures(&self) -> Result<bool, WasmSolanaError> {
        let message_data = self.signable_payload()?;
        let signer_keys = self.message.signer_keys();
        if self.signatures.len() != signer_keys.len() {
            return Ok(false);
        }
        Ok(self
            .signatures
            .iter()
            .zip(signer_keys)
            .all(|(signature, key)| signature.verify(key.as_ref(), &message_data)))
    }

    pub fn version(&self) -> TxVersion {
        self.message.version()
    }

    /// Check if this is a versioned transaction (MessageV0).
    pub fn is_versioned(&self) -> bool {
        self.version() == TxVersion::V0
    }

    /// Get the fee payer address as base58 string.
    pub fn fee_payer_string(&self) -> Option<String> {
        self.message
            .static_account_keys()
            .first()
            .map(|p| p.to_string())
    }

    /// Get the recent blockhash as base58 string.
    pub fn blockhash_string(&self) -> String {
        self.message.recent_blockhash().to_string()
    }

    pub fn num_instructions(&self) -> usize {
        self.message.compiled_instructions().len()
    }

    pub fn num_signatures(&self) -> usize {
        self.signatures.len()
    }

    /// Get the signable message bytes (what gets signed).
    pub fn signable_payload(&self) -> Result<Vec<u8>, WasmSolanaError> {
        Ok(self.message.serialize()?)
    }

    /// Static account keys (accounts stored directly in the message).
    pub fn static_account_keys(&self) -> Vec<String> {
        self.message
            .static_account_keys()
            .iter()
            .map(|k| k.to_string())
            .collect()
    }

    /// Address Lookup Table data (empty for legacy transactions).
    pub fn address_lookup_tables(&self) -> Vec<AddressLookupTableData> {
        self.message
            .address_table_lookups()
            .iter()
            .map(|alt| AddressLookupTableData {
                account_key: alt.account_key.to_string(),
                writable_indexes: alt.writable_indexes.clone(),
                readonly_indexes: alt.readonly_indexes.clone(),
            })
            .collect()
    }

    /// Index of `pubkey` among the required signers.
    pub fn signer_index(&self, pubkey: &str) -> Option<usize> {
        let target = Pubkey::from_str(pubkey).ok()?;
        self.message.signer_keys().iter().position(|k| *k == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_lookup_table::{AddressLookupTableAccount, AddressLookupTableState};
    use crate::instructions::system;
    use crate::message::MessageV0;
    use solana_hash::Hash;
    use solana_keypair::Keypair;

    // Legacy transaction from previous tests
    const LEGACY_TX_BASE64: &str = "AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABAAEDFVMqpim7tqEi2XL8R6KKkP0DYJvY3eiRXLlL1P9EjYgXKQC+k0FKnqyC4AZGJR7OhJXfpPP3NHOhS8t/6G7bLAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA/1c7Oaj3RbyLIjU0/ZPpsmVfVUWAzc8g36fK5g6A0JoBAgIAAQwCAAAAoIYBAAAAAAA=";

    fn decode_legacy_tx() -> VersionedTransaction {
        VersionedTransaction::from_base64(LEGACY_TX_BASE64).unwrap()
    }

    /// Transfer whose destination is loaded from a lookup table.
    fn v0_transfer(payer: &Keypair) -> (VersionedTransaction, Pubkey) {
        let dest = Pubkey::new_unique();
        let table = AddressLookupTableAccount::new(
            Pubkey::new_unique(),
            AddressLookupTableState {
                addresses: vec![Pubkey::new_unique(), dest],
                ..Default::default()
            },
        );
        let ix = system::transfer(&payer.pubkey(), &dest, 1_000).unwrap();
        let message = MessageV0::try_compile(
            &payer.pubkey(),
            &[ix],
            &[table.clone()],
            Hash::new_from_array([9; 32]),
        )
        .unwrap();
        let tx = VersionedTransaction::new(VersionedMessage::V0(message), None).unwrap();
        (tx, table.key)
    }

    #[test]
    fn test_deserialize_legacy_as_versioned() {
        let tx = decode_legacy_tx();
        assert!(!tx.is_versioned());
        assert_eq!(tx.version(), TxVersion::Legacy);
        assert_eq!(tx.num_signatures(), 1);
        assert_eq!(tx.num_instructions(), 1);
    }

    #[test]
    fn test_detect_version() {
        let bytes = BASE64_STANDARD.decode(LEGACY_TX_BASE64).unwrap();
        assert_eq!(detect_transaction_version(&bytes), TxVersion::Legacy);

        let (tx, _) = v0_transfer(&Keypair::new());
        assert_eq!(detect_transaction_version(&tx.to_bytes().unwrap()), TxVersion::V0);

        assert_eq!(detect_transaction_version(&[]), TxVersion::Legacy);
    }

    #[test]
    fn test_static_account_keys_legacy() {
        let tx = decode_legacy_tx();
        let keys = tx.static_account_keys();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[2], system::ID.to_string());
        assert_eq!(tx.fee_payer_string().as_deref(), Some(keys[0].as_str()));
    }

    #[test]
    fn test_address_lookup_tables() {
        assert!(decode_legacy_tx().address_lookup_tables().is_empty());

        let (tx, table_key) = v0_transfer(&Keypair::new());
        assert_eq!(
            tx.address_lookup_tables(),
            vec![AddressLookupTableData {
                account_key: table_key.to_string(),
                writable_indexes: vec![1],
                readonly_indexes: vec![],
            }]
        );
    }

    #[test]
    fn test_roundtrip() {
        let tx = decode_legacy_tx();
        assert_eq!(tx.to_base64().unwrap(), LEGACY_TX_BASE64);

        let (v0, _) = v0_transfer(&Keypair::new());
        let decoded = VersionedTransaction::from_bytes(&v0.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, v0);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = BASE64_STANDARD.decode(LEGACY_TX_BASE64).unwrap();
        bytes.push(0);
        assert!(VersionedTransaction::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_new_checks_signature_count() {
        let tx = decode_legacy_tx();
        assert!(VersionedTransaction::new(tx.message.clone(), Some(vec![])).is_err());
        let fresh = VersionedTransaction::new(tx.message, None).unwrap();
        assert_eq!(fresh.signatures, vec![Signature::default()]);
    }

    #[test]
    fn test_sign_and_verify_v0() {
        let payer = Keypair::new();
        let (mut tx, _) = v0_transfer(&payer);
        assert!(!tx.verify_signatures().unwrap());

        tx.sign(&[&payer]).unwrap();
        assert!(tx.verify_signatures().unwrap());
        assert_eq!(tx.signer_index(&payer.pubkey().to_string()), Some(0));
    }

    #[test]
    fn test_sign_with_non_signer_fails() {
        let (mut tx, _) = v0_transfer(&Keypair::new());
        let err = tx.sign(&[&Keypair::new()]).unwrap_err();
        assert!(err.to_string().contains("Cannot sign with non signer key"));
    }

    #[test]
    fn test_add_signature() {
        let mut tx = decode_legacy_tx();
        let fee_payer = tx.fee_payer_string().unwrap();

        let signature = [42u8; 64];
        tx.add_signature(&fee_payer, &signature).unwrap();
        assert_eq!(tx.signatures[0].as_ref(), &signature);

        assert!(tx.add_signature(&fee_payer, &[0u8; 10]).is_err());
        let err = tx
            .add_signature(&system::ID.to_string(), &signature)
            .unwrap_err();
        assert!(err.to_string().contains("unknown signer"));
    }
}

//! WASM binding for transaction building.
//!
//! Intents and raw message data arrive as plain JS objects and are read with
//! `serde-wasm-bindgen`.

use crate::builder::{self, RawVersionedTransactionData, TransactionIntent};
use crate::error::WasmSolanaError;
use crate::wasm::transaction::WasmVersionedTransaction;
use wasm_bindgen::prelude::*;

fn read_input<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, WasmSolanaError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| WasmSolanaError::new(&format!("Failed to parse {}: {}", what, e)))
}

/// Namespace for transaction building operations.
#[wasm_bindgen]
pub struct BuilderNamespace;

#[wasm_bindgen]
impl BuilderNamespace {
    /// Build an unsigned transaction from an intent.
    ///
    /// ```json
    /// {
    ///   "feePayer": "DgT9qyYwYKBRDyDw3EfR12LHQCQjtNrKu2qMsXHuosmB",
    ///   "nonce": { "type": "blockhash", "value": "GWaQEymC3Z9SHM2gkh8u12xL1zJPMHPCSVR3pSDpEXE4" },
    ///   "instructions": [
    ///     { "type": "transfer", "from": "...", "to": "...", "lamports": "1000000" },
    ///     { "type": "memo", "message": "invoice 1042" }
    ///   ]
    /// }
    /// ```
    ///
    /// A durable nonce is `{ "type": "durable", "address", "authority", "value" }`;
    /// its advance instruction is prepended automatically.
    ///
    /// Instruction types:
    ///
    /// - `transfer`: from, to, lamports
    /// - `createAccount`: from, newAccount, lamports, space, owner
    /// - `nonceAdvance` / `nonceInitialize`: nonce, authority
    /// - `nonceWithdraw`: nonce, to, lamports, authority
    /// - `allocate`: account, space
    /// - `assign`: account, owner
    /// - `memo`: message
    /// - `computeBudget`: unitLimit and/or unitPrice
    /// - `createLookupTable`: authority, payer, recentSlot
    /// - `extendLookupTable`: table, authority, payer (optional), addresses
    /// - `freezeLookupTable` / `deactivateLookupTable`: table, authority
    /// - `closeLookupTable`: table, authority, recipient
    ///
    /// With `addressLookupTables: [{ accountKey, addresses }]` the result is
    /// a v0 transaction that loads matching non-signer accounts through the
    /// tables.
    ///
    /// @returns Serialized transaction bytes with zero-filled signature slots
    #[wasm_bindgen]
    pub fn build_transaction(intent: JsValue) -> Result<Vec<u8>, WasmSolanaError> {
        let intent: TransactionIntent = read_input(intent, "transaction intent")?;
        builder::build_transaction(intent)
    }

    /// Serialize a pre-compiled v0 message. No instruction compilation
    /// happens; indexes and lookup references are written as given.
    ///
    /// ```json
    /// {
    ///   "staticAccountKeys": ["pubkey1", "pubkey2"],
    ///   "addressLookupTables": [
    ///     { "accountKey": "altPubkey", "writableIndexes": [0, 1], "readonlyIndexes": [2] }
    ///   ],
    ///   "versionedInstructions": [
    ///     { "programIdIndex": 0, "accountKeyIndexes": [1, 2], "data": "base58EncodedData" }
    ///   ],
    ///   "messageHeader": {
    ///     "numRequiredSignatures": 1,
    ///     "numReadonlySignedAccounts": 0,
    ///     "numReadonlyUnsignedAccounts": 3
    ///   },
    ///   "recentBlockhash": "blockhash"
    /// }
    /// ```
    #[wasm_bindgen]
    pub fn build_from_versioned_data(data: JsValue) -> Result<Vec<u8>, WasmSolanaError> {
        let data: RawVersionedTransactionData = read_input(data, "versioned transaction data")?;
        builder::build_from_raw_versioned_data(&data)
    }

    /// Same as `build_from_versioned_data`, returned as a transaction ready
    /// for signing.
    #[wasm_bindgen]
    pub fn versioned_transaction_from_data(
        data: JsValue,
    ) -> Result<WasmVersionedTransaction, WasmSolanaError> {
        let bytes = Self::build_from_versioned_data(data)?;
        WasmVersionedTransaction::from_bytes(&bytes)
    }
}

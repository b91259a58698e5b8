//! WASM binding for high-level transaction parsing.
//!
//! Exposes `parseTransaction` and its lookup-table aware variant, both
//! returning fully decoded transaction data.

use crate::address_lookup_table::AddressLookupTableAccount;
use crate::parser;
use crate::wasm::address_lookup_table::WasmAddressLookupTable;
use crate::wasm::try_into_js_value::TryIntoJsValue;
use wasm_bindgen::prelude::*;

/// Namespace for transaction parsing operations.
#[wasm_bindgen]
pub struct ParserNamespace;

#[wasm_bindgen]
impl ParserNamespace {
    /// Parse a serialized Solana transaction into structured data.
    ///
    /// Returns an object with:
    /// - `version`: `"legacy"` or `"0"`
    /// - `feePayer`: The fee payer address (base58)
    /// - `numSignatures`: Number of required signatures
    /// - `nonce`: The blockhash/nonce value (base58)
    /// - `durableNonce`: Durable nonce info, present when the first
    ///   instruction advances a nonce account
    /// - `instructionsData`: Decoded instructions, each with a `type` field
    ///   (e.g. "Transfer", "NonceAdvance", "SetPriorityFee", "Memo")
    /// - `signatures`: Signatures (base58), empty strings for unsigned slots
    /// - `accountKeys`: All account addresses (base58)
    ///
    /// Versioned transactions that reference lookup tables need
    /// `parseTransactionWithLookupTables`.
    ///
    /// @param bytes - The raw transaction bytes (wire format)
    #[wasm_bindgen]
    pub fn parse_transaction(bytes: &[u8]) -> Result<JsValue, JsValue> {
        let parsed = parser::parse_transaction(bytes)?;
        Ok(parsed.try_to_js_value()?)
    }

    /// Parse a transaction, resolving its lookup table references against
    /// `tables`.
    ///
    /// @param bytes - The raw transaction bytes (wire format)
    /// @param tables - Decoded lookup table accounts
    #[wasm_bindgen]
    pub fn parse_transaction_with_lookup_tables(
        bytes: &[u8],
        tables: Vec<WasmAddressLookupTable>,
    ) -> Result<JsValue, JsValue> {
        let tables: Vec<AddressLookupTableAccount> =
            tables.iter().map(|table| table.inner().clone()).collect();
        let parsed = parser::parse_transaction_with_lookup_tables(bytes, &tables)?;
        Ok(parsed.try_to_js_value()?)
    }
}

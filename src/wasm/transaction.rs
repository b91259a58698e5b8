//! WASM bindings for legacy and versioned transactions.

use crate::error::WasmSolanaError;
use crate::pubkey::{Pubkey, PubkeyExt};
use crate::transaction::{SerializeConfig, Transaction};
use crate::versioned::{detect_transaction_version, TxVersion, VersionedTransaction};
use crate::wasm::keypair::WasmKeypair;
use crate::wasm::try_into_js_value::{JsConversionError, TryIntoJsValue};
use solana_signer::Signer;
use wasm_bindgen::prelude::*;

/// Signatures are checked explicitly through `verify_signatures`; partially
/// signed transactions still serialize.
const UNCHECKED: SerializeConfig = SerializeConfig {
    require_all_signatures: false,
    verify_signatures: false,
};

fn conversion_error(err: JsConversionError) -> WasmSolanaError {
    WasmSolanaError::new(&err.to_string())
}

/// A legacy transaction.
///
/// Deserialized transactions keep their decoded message, so `to_bytes`
/// reproduces the input until instructions or signers change.
#[wasm_bindgen]
pub struct WasmTransaction {
    inner: Transaction,
}

#[wasm_bindgen]
impl WasmTransaction {
    /// Deserialize a transaction from a base64-encoded string.
    ///
    /// This is the format used by `@solana/web3.js` `Transaction.serialize()`.
    #[wasm_bindgen]
    pub fn from_base64(base64_str: &str) -> Result<WasmTransaction, WasmSolanaError> {
        Transaction::from_base64(base64_str).map(|inner| WasmTransaction { inner })
    }

    #[wasm_bindgen]
    pub fn from_bytes(bytes: &[u8]) -> Result<WasmTransaction, WasmSolanaError> {
        Transaction::from_bytes(bytes).map(|inner| WasmTransaction { inner })
    }

    /// Fee payer address, `undefined` when none is set.
    #[wasm_bindgen(getter)]
    pub fn fee_payer(&self) -> Option<String> {
        self.inner
            .fee_payer
            .or_else(|| self.inner.signatures.first().map(|pair| pair.public_key))
            .map(|key| key.to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn recent_blockhash(&self) -> Option<String> {
        self.inner
            .nonce_info
            .as_ref()
            .map(|info| info.nonce)
            .or(self.inner.recent_blockhash)
            .map(|hash| hash.to_string())
    }

    #[wasm_bindgen(getter)]
    pub fn num_instructions(&self) -> usize {
        self.inner.instructions.len()
    }

    #[wasm_bindgen(getter)]
    pub fn num_signatures(&self) -> usize {
        self.inner.signatures.len()
    }

    /// The serialized message, which is what signers sign.
    #[wasm_bindgen]
    pub fn signable_payload(&mut self) -> Result<js_sys::Uint8Array, WasmSolanaError> {
        let bytes = self.inner.serialize_message()?;
        Ok(js_sys::Uint8Array::from(&bytes[..]))
    }

    /// Serialize without requiring or verifying signatures. Missing
    /// signatures are written as zeros.
    #[wasm_bindgen]
    pub fn to_bytes(&mut self) -> Result<js_sys::Uint8Array, WasmSolanaError> {
        let bytes = self.inner.serialize(UNCHECKED)?;
        Ok(js_sys::Uint8Array::from(&bytes[..]))
    }

    #[wasm_bindgen]
    pub fn to_base64(&mut self) -> Result<String, WasmSolanaError> {
        self.inner.to_base64(UNCHECKED)
    }

    /// Account keys of the compiled message, in message order.
    #[wasm_bindgen]
    pub fn account_keys(&mut self) -> Result<js_sys::Array, WasmSolanaError> {
        let message = self.inner.compile_message()?;
        let arr = js_sys::Array::new();
        for key in &message.account_keys {
            arr.push(&JsValue::from_str(&key.to_string()));
        }
        Ok(arr)
    }

    /// Signature at `index` as base58; `undefined` when out of range or unsigned.
    #[wasm_bindgen]
    pub fn signature_at(&self, index: usize) -> Option<String> {
        self.inner
            .signatures
            .get(index)
            .and_then(|pair| pair.signature)
            .map(|s| s.to_string())
    }

    #[wasm_bindgen]
    pub fn signature_bytes_at(&self, index: usize) -> Option<js_sys::Uint8Array> {
        self.inner
            .signatures
            .get(index)
            .and_then(|pair| pair.signature)
            .map(|s| js_sys::Uint8Array::from(s.as_ref()))
    }

    /// Instruction at `index` as `{ programId, accounts, data }`, where each
    /// account is `{ pubkey, isSigner, isWritable }`.
    #[wasm_bindgen]
    pub fn instruction_at(&self, index: usize) -> Result<JsValue, WasmSolanaError> {
        match self.inner.instructions.get(index) {
            Some(instruction) => instruction.try_to_js_value().map_err(conversion_error),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen]
    pub fn instructions(&self) -> Result<JsValue, WasmSolanaError> {
        self.inner
            .instructions
            .try_to_js_value()
            .map_err(conversion_error)
    }

    /// Sign with `keypair`, keeping other signatures.
    #[wasm_bindgen]
    pub fn sign(&mut self, keypair: &WasmKeypair) -> Result<(), WasmSolanaError> {
        let signer: &dyn Signer = keypair.inner();
        self.inner.partial_sign(&[signer])
    }

    /// Attach a 64-byte signature produced elsewhere for `pubkey`.
    #[wasm_bindgen]
    pub fn add_signature(&mut self, pubkey: &str, signature: &[u8]) -> Result<(), WasmSolanaError> {
        let pubkey = Pubkey::from_base58(pubkey)?;
        self.inner.add_signature(&pubkey, signature)
    }

    /// Index of `pubkey` among the required signers.
    #[wasm_bindgen]
    pub fn signer_index(&self, pubkey: &str) -> Option<usize> {
        let pubkey = Pubkey::from_base58(pubkey).ok()?;
        self.inner.signer_index(&pubkey)
    }

    /// Check present signatures; with `require_all`, missing ones fail too.
    #[wasm_bindgen]
    pub fn verify_signatures(&mut self, require_all: bool) -> Result<bool, WasmSolanaError> {
        self.inner.verify_signatures(require_all)
    }
}

impl WasmTransaction {
    pub fn inner(&self) -> &Transaction {
        &self.inner
    }
}

/// A transaction of either version, kept in compiled form.
#[wasm_bindgen]
pub struct WasmVersionedTransaction {
    inner: VersionedTransaction,
}

#[wasm_bindgen]
impl WasmVersionedTransaction {
    #[wasm_bindgen]
    pub fn from_base64(base64_str: &str) -> Result<WasmVersionedTransaction, WasmSolanaError> {
        VersionedTransaction::from_base64(base64_str).map(|inner| WasmVersionedTransaction { inner })
    }

    #[wasm_bindgen]
    pub fn from_bytes(bytes: &[u8]) -> Result<WasmVersionedTransaction, WasmSolanaError> {
        VersionedTransaction::from_bytes(bytes).map(|inner| WasmVersionedTransaction { inner })
    }

    /// `"legacy"` or `"0"`.
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> String {
        self.inner.version().to_string()
    }

    #[wasm_bindgen]
    pub fn is_versioned(&self) -> bool {
        self.inner.is_versioned()
    }

    #[wasm_bindgen(getter)]
    pub fn fee_payer(&self) -> Option<String> {
        self.inner.fee_payer_string()
    }

    #[wasm_bindgen(getter)]
    pub fn recent_blockhash(&self) -> String {
        self.inner.blockhash_string()
    }

    #[wasm_bindgen(getter)]
    pub fn num_instructions(&self) -> usize {
        self.inner.num_instructions()
    }

    #[wasm_bindgen(getter)]
    pub fn num_signatures(&self) -> usize {
        self.inner.num_signatures()
    }

    #[wasm_bindgen]
    pub fn signable_payload(&self) -> Result<js_sys::Uint8Array, WasmSolanaError> {
        let bytes = self.inner.signable_payload()?;
        Ok(js_sys::Uint8Array::from(&bytes[..]))
    }

    #[wasm_bindgen]
    pub fn to_bytes(&self) -> Result<js_sys::Uint8Array, WasmSolanaError> {
        let bytes = self.inner.to_bytes()?;
        Ok(js_sys::Uint8Array::from(&bytes[..]))
    }

    #[wasm_bindgen]
    pub fn to_base64(&self) -> Result<String, WasmSolanaError> {
        self.inner.to_base64()
    }

    /// Keys stored in the message itself; lookup table keys are not resolved.
    #[wasm_bindgen]
    pub fn static_account_keys(&self) -> js_sys::Array {
        let arr = js_sys::Array::new();
        for key in self.inner.static_account_keys() {
            arr.push(&JsValue::from_str(&key));
        }
        arr
    }

    /// `[{ accountKey, writableIndexes, readonlyIndexes }]`, empty for legacy.
    #[wasm_bindgen]
    pub fn address_lookup_tables(&self) -> Result<JsValue, WasmSolanaError> {
        self.inner
            .address_lookup_tables()
            .try_to_js_value()
            .map_err(conversion_error)
    }

    /// Signature at `index` as base58, zero-filled slots included.
    #[wasm_bindgen]
    pub fn signature_at(&self, index: usize) -> Option<String> {
        self.inner.signatures.get(index).map(|s| s.to_string())
    }

    #[wasm_bindgen]
    pub fn signature_bytes_at(&self, index: usize) -> Option<js_sys::Uint8Array> {
        self.inner
            .signatures
            .get(index)
            .map(|s| js_sys::Uint8Array::from(s.as_ref()))
    }

    #[wasm_bindgen]
    pub fn sign(&mut self, keypair: &WasmKeypair) -> Result<(), WasmSolanaError> {
        let signer: &dyn Signer = keypair.inner();
        self.inner.sign(&[signer])
    }

    #[wasm_bindgen]
    pub fn add_signature(&mut self, pubkey: &str, signature: &[u8]) -> Result<(), WasmSolanaError> {
        self.inner.add_signature(pubkey, signature)
    }

    #[wasm_bindgen]
    pub fn signer_index(&self, pubkey: &str) -> Option<usize> {
        self.inner.signer_index(pubkey)
    }

    /// True when every required signer has a valid signature.
    #[wasm_bindgen]
    pub fn verify_signatures(&self) -> Result<bool, WasmSolanaError> {
        self.inner.verify_signatures()
    }
}

impl WasmVersionedTransaction {
    pub fn inner(&self) -> &VersionedTransaction {
        &self.inner
    }
}

/// Whether serialized transaction bytes carry a versioned (v0) message.
#[wasm_bindgen]
pub fn is_versioned_transaction(bytes: &[u8]) -> bool {
    detect_transaction_version(bytes) == TxVersion::V0
}

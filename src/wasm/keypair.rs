//! WASM bindings for the ed25519 keypairs that sign transactions.

use crate::error::WasmSolanaError;
use crate::keypair::{Keypair, KeypairExt};
use crate::message::SIGNATURE_LENGTH;
use crate::wasm::pubkey::WasmPubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use wasm_bindgen::prelude::*;

/// A signing keypair. Pass it to `WasmTransaction.sign` or
/// `WasmVersionedTransaction.sign`.
#[wasm_bindgen]
#[derive(Debug)]
pub struct WasmKeypair {
    inner: Keypair,
}

#[wasm_bindgen]
impl WasmKeypair {
    #[wasm_bindgen]
    pub fn generate() -> WasmKeypair {
        WasmKeypair {
            inner: Keypair::new(),
        }
    }

    /// From a 32-byte ed25519 seed.
    #[wasm_bindgen]
    pub fn from_secret_key(secret_key: &[u8]) -> Result<WasmKeypair, WasmSolanaError> {
        Keypair::from_secret_key_bytes(secret_key).map(|inner| WasmKeypair { inner })
    }

    /// From the 64-byte form used by Solana key files (seed then public key).
    #[wasm_bindgen]
    pub fn from_solana_secret_key(secret_key: &[u8]) -> Result<WasmKeypair, WasmSolanaError> {
        Keypair::from_solana_secret_key(secret_key).map(|inner| WasmKeypair { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn pubkey(&self) -> WasmPubkey {
        WasmPubkey::from_inner(self.inner.pubkey())
    }

    /// Base58 address of the public key.
    #[wasm_bindgen]
    pub fn address(&self) -> String {
        self.inner.address()
    }

    #[wasm_bindgen(getter)]
    pub fn public_key(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.inner.public_key_bytes()[..])
    }

    /// The 32-byte seed.
    #[wasm_bindgen(getter)]
    pub fn secret_key(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.inner.secret_key_bytes()[..])
    }

    /// Seed and public key concatenated (64 bytes).
    #[wasm_bindgen]
    pub fn to_solana_secret_key(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.inner.to_bytes()[..])
    }

    /// Detached 64-byte signature over `message`.
    #[wasm_bindgen]
    pub fn sign(&self, message: &[u8]) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.inner.sign_bytes(message)[..])
    }

    /// Check a detached signature made by this keypair.
    #[wasm_bindgen]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, WasmSolanaError> {
        let bytes = <[u8; SIGNATURE_LENGTH]>::try_from(signature).map_err(|_| {
            WasmSolanaError::new(&format!(
                "Invalid signature length: expected 64 bytes, got {}",
                signature.len()
            ))
        })?;
        Ok(Signature::from(bytes).verify(&self.inner.public_key_bytes(), message))
    }
}

impl WasmKeypair {
    pub fn inner(&self) -> &Keypair {
        &self.inner
    }
}

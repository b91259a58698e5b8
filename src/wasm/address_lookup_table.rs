//! WASM bindings for address lookup table accounts.

use crate::address_lookup_table::AddressLookupTableAccount;
use crate::error::WasmSolanaError;
use crate::pubkey::{Pubkey, PubkeyExt};
use crate::wasm::try_into_js_value::TryIntoJsValue;
use wasm_bindgen::prelude::*;

/// A decoded lookup table account.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct WasmAddressLookupTable {
    inner: AddressLookupTableAccount,
}

#[wasm_bindgen]
impl WasmAddressLookupTable {
    /// Decode raw account data fetched for the table at `key`.
    #[wasm_bindgen]
    pub fn from_account_data(
        key: &str,
        data: &[u8],
    ) -> Result<WasmAddressLookupTable, WasmSolanaError> {
        let key = Pubkey::from_base58(key)?;
        AddressLookupTableAccount::from_account_data(key, data)
            .map(|inner| WasmAddressLookupTable { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn key(&self) -> String {
        self.inner.key.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// `u64::MAX` while the table is active.
    #[wasm_bindgen(getter)]
    pub fn deactivation_slot(&self) -> u64 {
        self.inner.state.deactivation_slot
    }

    /// `undefined` once the table is frozen.
    #[wasm_bindgen(getter)]
    pub fn authority(&self) -> Option<String> {
        self.inner.state.authority.map(|key| key.to_string())
    }

    #[wasm_bindgen]
    pub fn addresses(&self) -> js_sys::Array {
        let arr = js_sys::Array::new();
        for address in self.inner.addresses() {
            arr.push(&JsValue::from_str(&address.to_string()));
        }
        arr
    }

    /// The full decoded state as a plain object.
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, WasmSolanaError> {
        self.inner
            .state
            .try_to_js_value()
            .map_err(|e| WasmSolanaError::new(&e.to_string()))
    }
}

impl WasmAddressLookupTable {
    pub fn inner(&self) -> &AddressLookupTableAccount {
        &self.inner
    }
}

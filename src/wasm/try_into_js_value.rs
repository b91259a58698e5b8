//! Conversion of Rust values into plain JavaScript values.
//!
//! `u64` amounts and slots become `BigInt`, keys become base58 strings and
//! raw bytes become `Uint8Array`.

use crate::address_lookup_table::AddressLookupTableState;
use crate::instruction::{AccountMeta, Instruction};
use crate::versioned::AddressLookupTableData;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use wasm_bindgen::JsValue;

/// Error type for JS value conversion failures.
#[derive(Debug)]
pub struct JsConversionError(String);

impl JsConversionError {
    pub fn new(msg: &str) -> Self {
        JsConversionError(msg.to_string())
    }
}

impl std::fmt::Display for JsConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<JsConversionError> for JsValue {
    fn from(err: JsConversionError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

pub trait TryIntoJsValue {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError>;
}

/// Bytes that should reach JavaScript as a `Uint8Array` rather than an
/// array of numbers.
pub struct JsBytes<'a>(pub &'a [u8]);

impl TryIntoJsValue for JsBytes<'_> {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(js_sys::Uint8Array::from(self.0).into())
    }
}

impl TryIntoJsValue for String {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_str(self))
    }
}

impl TryIntoJsValue for str {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_str(self))
    }
}

impl TryIntoJsValue for &str {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_str(self))
    }
}

impl TryIntoJsValue for u8 {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_f64(*self as f64))
    }
}

impl TryIntoJsValue for u32 {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_f64(*self as f64))
    }
}

impl TryIntoJsValue for usize {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_f64(*self as f64))
    }
}

impl TryIntoJsValue for u64 {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(js_sys::BigInt::from(*self).into())
    }
}

impl TryIntoJsValue for bool {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_bool(*self))
    }
}

impl TryIntoJsValue for Pubkey {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_str(&self.to_string()))
    }
}

impl TryIntoJsValue for Signature {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        Ok(JsValue::from_str(&self.to_string()))
    }
}

impl<T: TryIntoJsValue> TryIntoJsValue for Option<T> {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        match self {
            Some(v) => v.try_to_js_value(),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

impl<T: TryIntoJsValue> TryIntoJsValue for Vec<T> {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        let arr = js_sys::Array::new();
        for item in self.iter() {
            arr.push(&item.try_to_js_value()?);
        }
        Ok(arr.into())
    }
}

/// Build a JavaScript object from `key => value` pairs. Every value must
/// implement `TryIntoJsValue`.
#[macro_export]
macro_rules! js_obj {
    ( $( $key:expr => $value:expr ),* $(,)? ) => {{
        let obj = js_sys::Object::new();
        $(
            js_sys::Reflect::set(
                &obj,
                &wasm_bindgen::JsValue::from_str($key),
                &$crate::wasm::try_into_js_value::TryIntoJsValue::try_to_js_value(&$value)?
            ).map_err(|_| $crate::wasm::try_into_js_value::JsConversionError::new(
                concat!("Failed to set object property: ", $key)
            ))?;
        )*
        Ok::<wasm_bindgen::JsValue, $crate::wasm::try_into_js_value::JsConversionError>(obj.into())
    }};
}

pub use js_obj;

impl TryIntoJsValue for AccountMeta {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "pubkey" => self.pubkey,
            "isSigner" => self.is_signer,
            "isWritable" => self.is_writable
        )
    }
}

impl TryIntoJsValue for Instruction {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "programId" => self.program_id,
            "accounts" => self.accounts,
            "data" => JsBytes(&self.data)
        )
    }
}

impl TryIntoJsValue for AddressLookupTableData {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "accountKey" => self.account_key,
            "writableIndexes" => self.writable_indexes,
            "readonlyIndexes" => self.readonly_indexes
        )
    }
}

impl TryIntoJsValue for AddressLookupTableState {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "deactivationSlot" => self.deactivation_slot,
            "lastExtendedSlot" => self.last_extended_slot,
            "lastExtendedSlotStartIndex" => self.last_extended_slot_start_index,
            "authority" => self.authority,
            "addresses" => self.addresses
        )
    }
}

//! TryIntoJsValue implementations for instruction types.
//!
//! Converts Rust instruction types directly to JavaScript objects with
//! proper BigInt handling for u64 amounts.

use crate::js_obj;
use crate::wasm::try_into_js_value::{JsConversionError, TryIntoJsValue};
use base64::prelude::*;
use wasm_bindgen::JsValue;

use super::types::*;

// =============================================================================
// System Program Params
// =============================================================================

impl TryIntoJsValue for TransferParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "Transfer",
            "fromAddress" => self.from_address,
            "toAddress" => self.to_address,
            "amount" => self.amount
        )
    }
}

impl TryIntoJsValue for CreateAccountParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "CreateAccount",
            "fromAddress" => self.from_address,
            "newAddress" => self.new_address,
            "amount" => self.amount,
            "space" => self.space,
            "owner" => self.owner
        )
    }
}

impl TryIntoJsValue for AssignParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "Assign",
            "accountAddress" => self.account_address,
            "owner" => self.owner
        )
    }
}

impl TryIntoJsValue for AllocateParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "Allocate",
            "accountAddress" => self.account_address,
            "space" => self.space
        )
    }
}

impl TryIntoJsValue for NonceAdvanceParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "NonceAdvance",
            "walletNonceAddress" => self.wallet_nonce_address,
            "authWalletAddress" => self.auth_wallet_address
        )
    }
}

impl TryIntoJsValue for NonceInitializeParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "NonceInitialize",
            "nonceAddress" => self.nonce_address,
            "authAddress" => self.auth_address
        )
    }
}

impl TryIntoJsValue for NonceWithdrawParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "NonceWithdraw",
            "nonceAddress" => self.nonce_address,
            "toAddress" => self.to_address,
            "authAddress" => self.auth_address,
            "amount" => self.amount
        )
    }
}

impl TryIntoJsValue for NonceAuthorizeParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "NonceAuthorize",
            "nonceAddress" => self.nonce_address,
            "authAddress" => self.auth_address,
            "newAuthAddress" => self.new_auth_address
        )
    }
}

// =============================================================================
// ComputeBudget Params
// =============================================================================

impl TryIntoJsValue for SetComputeUnitLimitParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "SetComputeUnitLimit",
            "units" => self.units
        )
    }
}

impl TryIntoJsValue for SetPriorityFeeParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "SetPriorityFee",
            "fee" => self.fee
        )
    }
}

// =============================================================================
// Address Lookup Table Params
// =============================================================================

impl TryIntoJsValue for CreateLookupTableParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "CreateLookupTable",
            "tableAddress" => self.table_address,
            "authorityAddress" => self.authority_address,
            "payerAddress" => self.payer_address,
            "recentSlot" => self.recent_slot,
            "bumpSeed" => self.bump_seed
        )
    }
}

impl TryIntoJsValue for ExtendLookupTableParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "ExtendLookupTable",
            "tableAddress" => self.table_address,
            "authorityAddress" => self.authority_address,
            "payerAddress" => self.payer_address,
            "addresses" => self.addresses
        )
    }
}

fn authority_params_js(
    kind: &str,
    params: &LookupTableAuthorityParams,
) -> Result<JsValue, JsConversionError> {
    js_obj!(
        "type" => kind,
        "tableAddress" => params.table_address,
        "authorityAddress" => params.authority_address
    )
}

impl TryIntoJsValue for CloseLookupTableParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "CloseLookupTable",
            "tableAddress" => self.table_address,
            "authorityAddress" => self.authority_address,
            "recipientAddress" => self.recipient_address
        )
    }
}

// =============================================================================
// Memo & Unknown
// =============================================================================

impl TryIntoJsValue for MemoParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "Memo",
            "memo" => self.memo
        )
    }
}

impl TryIntoJsValue for AccountMeta {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "pubkey" => self.pubkey,
            "isSigner" => self.is_signer,
            "isWritable" => self.is_writable
        )
    }
}

impl TryIntoJsValue for UnknownInstructionParams {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        js_obj!(
            "type" => "Unknown",
            "programId" => self.program_id,
            "accounts" => self.accounts,
            "data" => BASE64_STANDARD.encode(&self.data)
        )
    }
}

// =============================================================================
// ParsedInstruction enum
// =============================================================================

impl TryIntoJsValue for ParsedInstruction {
    fn try_to_js_value(&self) -> Result<JsValue, JsConversionError> {
        match self {
            ParsedInstruction::Transfer(p) => p.try_to_js_value(),
            ParsedInstruction::CreateAccount(p) => p.try_to_js_value(),
            ParsedInstruction::Assign(p) => p.try_to_js_value(),
            ParsedInstruction::Allocate(p) => p.try_to_js_value(),
            ParsedInstruction::NonceAdvance(p) => p.try_to_js_value(),
            ParsedInstruction::NonceInitialize(p) => p.try_to_js_value(),
            ParsedInstruction::NonceWithdraw(p) => p.try_to_js_value(),
            ParsedInstruction::NonceAuthorize(p) => p.try_to_js_value(),
            ParsedInstruction::SetComputeUnitLimit(p) => p.try_to_js_value(),
            ParsedInstruction::SetPriorityFee(p) => p.try_to_js_value(),
            ParsedInstruction::Memo(p) => p.try_to_js_value(),
            ParsedInstruction::CreateLookupTable(p) => p.try_to_js_value(),
            ParsedInstruction::ExtendLookupTable(p) => p.try_to_js_value(),
            ParsedInstruction::FreezeLookupTable(p) => authority_params_js("FreezeLookupTable", p),
            ParsedInstruction::DeactivateLookupTable(p) => {
                authority_params_js("DeactivateLookupTable", p)
            }
            ParsedInstruction::CloseLookupTable(p) => p.try_to_js_value(),
            ParsedInstruction::Unknown(p) => p.try_to_js_value(),
        }
    }
}

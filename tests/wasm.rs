//! Tests for the JS-facing bindings. Run with `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use solana_pubkey::Pubkey;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use wasm_solana_wire::builder::{self, TransactionIntent};
use wasm_solana_wire::{ParserNamespace, WasmKeypair, WasmTransaction};

fn transfer_bytes(payer: &WasmKeypair) -> Vec<u8> {
    let intent: TransactionIntent = serde_json::from_value(serde_json::json!({
        "feePayer": payer.address(),
        "nonce": { "type": "blockhash", "value": Pubkey::new_unique().to_string() },
        "instructions": [
            {
                "type": "transfer",
                "from": payer.address(),
                "to": Pubkey::new_unique().to_string(),
                "lamports": "5000"
            }
        ]
    }))
    .unwrap();
    builder::build_transaction(intent).unwrap()
}

#[wasm_bindgen_test]
fn test_keypair_sign_and_verify() {
    let keypair = WasmKeypair::generate();
    let signature = keypair.sign(b"hello").to_vec();
    assert_eq!(signature.len(), 64);
    assert!(keypair.verify(b"hello", &signature).unwrap());
    assert!(!keypair.verify(b"hullo", &signature).unwrap());
    assert!(keypair.verify(b"hello", &signature[..63]).is_err());
}

#[wasm_bindgen_test]
fn test_sign_built_transaction() {
    let payer = WasmKeypair::generate();
    let bytes = transfer_bytes(&payer);

    let mut tx = WasmTransaction::from_bytes(&bytes).unwrap();
    assert_eq!(tx.num_signatures(), 1);
    assert!(!tx.verify_signatures(true).unwrap());
    tx.sign(&payer).unwrap();
    assert!(tx.verify_signatures(true).unwrap());
    assert_eq!(tx.signer_index(&payer.address()), Some(0));
}

#[wasm_bindgen_test]
fn test_parse_reports_fee_payer() {
    let payer = WasmKeypair::generate();
    let parsed = ParserNamespace::parse_transaction(&transfer_bytes(&payer)).unwrap();
    let fee_payer = js_sys::Reflect::get(&parsed, &JsValue::from_str("feePayer")).unwrap();
    assert_eq!(fee_payer.as_string(), Some(payer.address()));
}

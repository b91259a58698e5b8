//! Well-known program and sysvar addresses, plus address derivations, for
//! JavaScript callers.

use wasm_bindgen::prelude::*;

use crate::address_lookup_table::instruction::derive_lookup_table_address;
use crate::error::WasmSolanaError;
use crate::instructions::nonce::NONCE_ACCOUNT_LENGTH;
use crate::instructions::{
    ADDRESS_LOOKUP_TABLE_PROGRAM_ID, COMPUTE_BUDGET_PROGRAM_ID, MEMO_PROGRAM_ID,
    SYSTEM_PROGRAM_ID, SYSVAR_RECENT_BLOCKHASHES, SYSVAR_RENT,
};
use crate::message::PACKET_DATA_SIZE;
use crate::pubkey::{Pubkey, PubkeyExt};

#[wasm_bindgen]
pub fn system_program_id() -> String {
    SYSTEM_PROGRAM_ID.to_string()
}

#[wasm_bindgen]
pub fn compute_budget_program_id() -> String {
    COMPUTE_BUDGET_PROGRAM_ID.to_string()
}

#[wasm_bindgen]
pub fn memo_program_id() -> String {
    MEMO_PROGRAM_ID.to_string()
}

#[wasm_bindgen]
pub fn address_lookup_table_program_id() -> String {
    ADDRESS_LOOKUP_TABLE_PROGRAM_ID.to_string()
}

/// Sysvar Recent Blockhashes address
/// Reference: https://github.com/solana-labs/solana/blob/v1.18.26/sdk/program/src/sysvar/recent_blockhashes.rs
#[wasm_bindgen]
pub fn sysvar_recent_blockhashes() -> String {
    SYSVAR_RECENT_BLOCKHASHES.to_string()
}

#[wasm_bindgen]
pub fn sysvar_rent() -> String {
    SYSVAR_RENT.to_string()
}

/// Nonce account space in bytes (80)
#[wasm_bindgen]
pub fn nonce_account_space() -> u64 {
    NONCE_ACCOUNT_LENGTH as u64
}

/// Largest serialized transaction accepted by the network (1232 bytes).
#[wasm_bindgen]
pub fn max_transaction_size() -> usize {
    PACKET_DATA_SIZE
}

/// Derive the address of the lookup table `authority` creates at `recent_slot`.
///
/// @param authority - Table authority address (base58)
/// @param recent_slot - Recent slot used as the derivation seed
/// @returns The derived table address (base58)
#[wasm_bindgen]
pub fn derive_lookup_table_address_for(
    authority: &str,
    recent_slot: u64,
) -> Result<String, WasmSolanaError> {
    let authority = Pubkey::from_base58(authority)?;
    let (address, _bump) = derive_lookup_table_address(&authority, recent_slot);
    Ok(address.to_string())
}

/// Derive an address from a base address, a text seed and an owner program.
///
/// @param base - Base address (base58)
/// @param seed - Seed string, at most 32 bytes
/// @param owner - Owner program ID (base58)
/// @returns The derived address (base58)
#[wasm_bindgen]
pub fn create_with_seed(base: &str, seed: &str, owner: &str) -> Result<String, WasmSolanaError> {
    let base = Pubkey::from_base58(base)?;
    let owner = Pubkey::from_base58(owner)?;
    Pubkey::derive_with_seed(&base, seed, &owner).map(|address| address.to_string())
}

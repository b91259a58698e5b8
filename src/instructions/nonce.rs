//! Durable nonce account data.
//!
//! ```text
//! version u32 | state u32 | authority pubkey | nonce hash (32) | lamports per signature u64
//! ```

use crate::error::{LayoutError, WasmSolanaError};
use crate::layout::{Field, Layout};
use crate::message::hash_from_value;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use std::sync::OnceLock;

/// Size of a nonce account's data.
pub const NONCE_ACCOUNT_LENGTH: usize = 80;

fn nonce_account_layout() -> &'static Layout {
    static LAYOUT: OnceLock<Layout> = OnceLock::new();
    LAYOUT.get_or_init(|| {
        Layout::structure(vec![
            Field::new("version", Layout::u32()),
            Field::new("state", Layout::u32()),
            Field::new("authorizedPubkey", Layout::public_key()),
            Field::new("nonce", Layout::blob(32)),
            Field::new(
                "feeCalculator",
                Layout::structure(vec![Field::new("lamportsPerSignature", Layout::u64())]),
            ),
        ])
    })
}

/// Decoded state of an initialized nonce account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceAccount {
    pub authorized_pubkey: Pubkey,
    /// Stored durable nonce, used in place of a recent blockhash.
    pub nonce: Hash,
    pub lamports_per_signature: u64,
}

impl NonceAccount {
    pub fn from_account_data(data: &[u8]) -> Result<Self, WasmSolanaError> {
        if data.len() < NONCE_ACCOUNT_LENGTH {
            return Err(LayoutError::out_of_bounds(0, NONCE_ACCOUNT_LENGTH, data.len()).into());
        }
        let value = nonce_account_layout().decode(data, 0)?;
        let fields = value.as_struct().ok_or_else(|| value.mismatch("struct"))?;
        let fee_calculator = fields.fields("feeCalculator")?;
        Ok(NonceAccount {
            authorized_pubkey: fields.pubkey("authorizedPubkey")?,
            nonce: hash_from_value(fields, "nonce")?,
            lamports_per_signature: fee_calculator
                .u64("lamportsPerSignature")
                .map_err(|e| e.within("feeCalculator"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_account_data() {
        let authority = Pubkey::new_unique();
        let nonce = Hash::new_from_array([9; 32]);
        let mut data = vec![1, 0, 0, 0, 1, 0, 0, 0];
        data.extend_from_slice(authority.as_ref());
        data.extend_from_slice(nonce.as_ref());
        data.extend_from_slice(&5000u64.to_le_bytes());
        assert_eq!(data.len(), NONCE_ACCOUNT_LENGTH);

        let account = NonceAccount::from_account_data(&data).unwrap();
        assert_eq!(account.authorized_pubkey, authority);
        assert_eq!(account.nonce, nonce);
        assert_eq!(account.lamports_per_signature, 5000);
    }

    #[test]
    fn test_short_data() {
        assert!(NonceAccount::from_account_data(&[0u8; 79]).is_err());
    }
}

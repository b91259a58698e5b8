//! Memo Program instructions. The data is the memo text itself.

use super::types::MEMO_PROGRAM_ID;
use crate::error::WasmSolanaError;
use crate::instruction::{AccountMeta, Instruction};
use solana_pubkey::Pubkey;

pub const ID: Pubkey = Pubkey::from_str_const(MEMO_PROGRAM_ID);

/// Memo instruction; each of `signers` must sign the transaction.
pub fn build_memo(memo: &str, signers: &[Pubkey]) -> Instruction {
    Instruction::new(
        ID,
        signers
            .iter()
            .map(|signer| AccountMeta::new_readonly(*signer, true))
            .collect(),
        memo.as_bytes().to_vec(),
    )
}

pub fn decode_memo(data: &[u8]) -> Result<String, WasmSolanaError> {
    std::str::from_utf8(data)
        .map(str::to_string)
        .map_err(|e| WasmSolanaError::new(&format!("Memo is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_round_trip() {
        let signer = Pubkey::new_unique();
        let ix = build_memo("hello", &[signer]);
        assert_eq!(ix.program_id.to_string(), MEMO_PROGRAM_ID);
        assert_eq!(ix.accounts, vec![AccountMeta::new_readonly(signer, true)]);
        assert_eq!(decode_memo(&ix.data).unwrap(), "hello");
        assert!(decode_memo(&[0xff, 0xfe]).is_err());
    }
}

//! Solana public keys (addresses) and address derivation.

use crate::error::WasmSolanaError;
use crate::message::PUBKEY_LENGTH;
use std::str::FromStr;

pub use solana_pubkey::Pubkey;

/// Fallible constructors and derivations reporting `WasmSolanaError`.
pub trait PubkeyExt: Sized {
    fn from_base58(address: &str) -> Result<Self, WasmSolanaError>;
    fn from_bytes_checked(bytes: &[u8]) -> Result<Self, WasmSolanaError>;
    /// Address derived from `base`, a text seed and the owning program.
    fn derive_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Self, WasmSolanaError>;
    /// Off-curve program address and its bump seed.
    fn derive_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Self, u8), WasmSolanaError>;
}

impl PubkeyExt for Pubkey {
    fn from_base58(address: &str) -> Result<Pubkey, WasmSolanaError> {
        Pubkey::from_str(address)
            .map_err(|e| WasmSolanaError::new(&format!("Invalid base58: {}", e)))
    }

    fn from_bytes_checked(bytes: &[u8]) -> Result<Pubkey, WasmSolanaError> {
        let array: [u8; PUBKEY_LENGTH] = bytes.try_into().map_err(|_| {
            WasmSolanaError::new(&format!(
                "Invalid public key length: expected 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Pubkey::from(array))
    }

    fn derive_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey, WasmSolanaError> {
        Pubkey::create_with_seed(base, seed, owner)
            .map_err(|e| WasmSolanaError::new(&format!("Invalid seed derivation: {}", e)))
    }

    fn derive_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<(Pubkey, u8), WasmSolanaError> {
        Pubkey::try_find_program_address(seeds, program_id)
            .ok_or_else(|| WasmSolanaError::new("Unable to find a viable program address bump seed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::system;

    #[test]
    fn test_from_base58() {
        let address = "FKjSjCqByQRwSzZoMXA7bKnDbJe41YgJTHFFzBeC42bH";
        let pubkey = Pubkey::from_base58(address).unwrap();
        assert_eq!(pubkey.to_string(), address);
        assert!(pubkey.is_on_curve());
    }

    #[test]
    fn test_invalid_input() {
        assert!(Pubkey::from_base58("invalid!@#$").is_err());
        assert!(Pubkey::from_bytes_checked(&[0u8; 31]).is_err());
        assert!(Pubkey::from_bytes_checked(&[0u8; 33]).is_err());
    }

    #[test]
    fn test_system_program_is_zero_key() {
        let from_bytes = Pubkey::from_bytes_checked(&[0u8; 32]).unwrap();
        assert_eq!(from_bytes, system::ID);
        assert_eq!(from_bytes.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn test_derive_with_seed() {
        let base = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let derived = Pubkey::derive_with_seed(&base, "vault:0", &owner).unwrap();
        assert_eq!(derived, Pubkey::create_with_seed(&base, "vault:0", &owner).unwrap());

        let too_long = "x".repeat(33);
        assert!(Pubkey::derive_with_seed(&base, &too_long, &owner).is_err());
    }

    #[test]
    fn test_derive_program_address_is_off_curve() {
        let program_id = Pubkey::new_unique();
        let (address, bump) = Pubkey::derive_program_address(&[b"seed"], &program_id).unwrap();
        assert!(!address.is_on_curve());
        assert_eq!(
            Pubkey::create_program_address(&[b"seed", &[bump]], &program_id).unwrap(),
            address
        );
    }
}

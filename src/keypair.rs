//! Ed25519 keypairs: import/export helpers and raw message signing.

use crate::error::WasmSolanaError;
use crate::message::SIGNATURE_LENGTH;
use solana_signature::Signature;
use solana_signer::Signer;

pub use solana_keypair::Keypair;

/// Extension trait for Keypair to add WASM-friendly methods.
pub trait KeypairExt {
    fn from_secret_key_bytes(secret_key: &[u8]) -> Result<Keypair, WasmSolanaError>;
    fn from_solana_secret_key(secret_key: &[u8]) -> Result<Keypair, WasmSolanaError>;
    fn public_key_bytes(&self) -> [u8; 32];
    fn secret_key_bytes(&self) -> [u8; 32];
    fn address(&self) -> String;
    /// Detached signature over `message`.
    fn sign_bytes(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH];
}

impl KeypairExt for Keypair {
    /// Create a keypair from a 32-byte secret key (Ed25519 seed).
    fn from_secret_key_bytes(secret_key: &[u8]) -> Result<Keypair, WasmSolanaError> {
        let bytes: [u8; 32] = secret_key.try_into().map_err(|_| {
            WasmSolanaError::new(&format!(
                "Secret key must be 32 bytes, got {}",
                secret_key.len()
            ))
        })?;
        Ok(Keypair::new_from_array(bytes))
    }

    /// Create a keypair from a 64-byte Solana secret key (secret + public concatenated).
    fn from_solana_secret_key(secret_key: &[u8]) -> Result<Keypair, WasmSolanaError> {
        if secret_key.len() != 64 {
            return Err(WasmSolanaError::new(&format!(
                "Solana secret key must be 64 bytes, got {}",
                secret_key.len()
            )));
        }
        Keypair::try_from(secret_key)
            .map_err(|e| WasmSolanaError::new(&format!("Invalid keypair: {}", e)))
    }

    fn public_key_bytes(&self) -> [u8; 32] {
        self.pubkey().to_bytes()
    }

    /// The 32-byte seed half of the secret key.
    fn secret_key_bytes(&self) -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&self.to_bytes()[..32]);
        secret
    }

    fn address(&self) -> String {
        self.pubkey().to_string()
    }

    fn sign_bytes(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        let signature: Signature = self.sign_message(message);
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(signature.as_ref());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_secret_key() {
        let secret = [1u8; 32];
        let keypair = Keypair::from_secret_key_bytes(&secret).unwrap();
        assert_eq!(keypair.secret_key_bytes(), secret);
        assert_eq!(
            Keypair::from_secret_key_bytes(&secret).unwrap().address(),
            keypair.address()
        );
    }

    #[test]
    fn test_solana_secret_key_format() {
        let secret = [1u8; 32];
        let keypair = Keypair::from_secret_key_bytes(&secret).unwrap();

        let mut solana_secret = [0u8; 64];
        solana_secret[..32].copy_from_slice(&secret);
        solana_secret[32..].copy_from_slice(&keypair.public_key_bytes());

        let keypair2 = Keypair::from_solana_secret_key(&solana_secret).unwrap();
        assert_eq!(keypair.address(), keypair2.address());
    }

    #[test]
    fn test_invalid_secret_key_length() {
        assert!(Keypair::from_secret_key_bytes(&[0u8; 31]).is_err());
        assert!(Keypair::from_solana_secret_key(&[0u8; 63]).is_err());
    }

    /// Known seed to address vector.
    #[test]
    fn test_known_address() {
        let seed: [u8; 32] = [
            210, 49, 239, 175, 249, 91, 42, 66, 77, 70, 3, 144, 23, 0, 145, 152, 86, 35, 166, 11,
            129, 49, 201, 162, 255, 195, 94, 229, 98, 78, 76, 38,
        ];
        let keypair = Keypair::from_secret_key_bytes(&seed).unwrap();
        assert_eq!(keypair.address(), "FKjSjCqByQRwSzZoMXA7bKnDbJe41YgJTHFFzBeC42bH");
    }

    #[test]
    fn test_sign_bytes_verifies() {
        let keypair = Keypair::new();
        let message = b"transfer 100000 lamports";
        let signature = Signature::from(keypair.sign_bytes(message));
        assert!(signature.verify(&keypair.public_key_bytes(), message));
        assert!(!signature.verify(&keypair.public_key_bytes(), b"other message"));
    }
}

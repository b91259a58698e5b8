//! Legacy Solana transactions: instructions plus a signature list.
//!
//! # Wire Format
//!
//! Solana transactions use a compact binary format:
//! - Signatures (compact-u16 count, then 64 bytes each)
//! - Message (contains instructions, accounts, blockhash)
//!
//! The transaction keeps its instructions uncompiled. The message is compiled
//! on demand and memoized until any of its inputs change.

use crate::error::{CompileError, LayoutError, WasmSolanaError};
use crate::instruction::{AccountMeta, Instruction};
use crate::layout::Value;
use crate::message::{
    CompiledKeys, Message, MessageSchema, PACKET_DATA_SIZE, SIGNATURE_LENGTH,
};
use base64::prelude::*;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;

/// A signer's public key and, once signed, its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePubkeyPair {
    pub public_key: Pubkey,
    pub signature: Option<Signature>,
}

impl SignaturePubkeyPair {
    fn unsigned(public_key: Pubkey) -> Self {
        SignaturePubkeyPair {
            public_key,
            signature: None,
        }
    }
}

/// Durable nonce to use in place of a recent blockhash.
///
/// `nonce_instruction` (an AdvanceNonceAccount) is prepended to the
/// instructions at compile time unless it already comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceInformation {
    pub nonce: Hash,
    pub nonce_instruction: Instruction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeConfig {
    /// Fail if any required signature is missing.
    pub require_all_signatures: bool,
    /// Verify present signatures against the message.
    pub verify_signatures: bool,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        SerializeConfig {
            require_all_signatures: true,
            verify_signatures: true,
        }
    }
}

/// Everything `compile_message` reads. The cached message is reused while
/// this is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageInputs {
    fee_payer: Option<Pubkey>,
    recent_blockhash: Option<Hash>,
    nonce_info: Option<NonceInformation>,
    instructions: Vec<Instruction>,
    signers: Vec<Pubkey>,
}

#[derive(Debug, Clone, Default)]
pub struct Transaction {
    /// One entry per required signer, in message order after compilation.
    pub signatures: Vec<SignaturePubkeyPair>,
    pub fee_payer: Option<Pubkey>,
    pub instructions: Vec<Instruction>,
    pub recent_blockhash: Option<Hash>,
    pub nonce_info: Option<NonceInformation>,
    compiled: Option<(MessageInputs, Message)>,
}

impl Transaction {
    pub fn new(fee_payer: Pubkey, recent_blockhash: Hash) -> Self {
        Transaction {
            fee_payer: Some(fee_payer),
            recent_blockhash: Some(recent_blockhash),
            ..Default::default()
        }
    }

    /// A transaction that uses a durable nonce instead of a recent blockhash.
    pub fn with_nonce(fee_payer: Pubkey, nonce_info: NonceInformation) -> Self {
        Transaction {
            fee_payer: Some(fee_payer),
            nonce_info: Some(nonce_info),
            ..Default::default()
        }
    }

    /// First signature, which identifies the transaction.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first().and_then(|pair| pair.signature.as_ref())
    }

    pub fn add(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn add_instructions(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> &mut Self {
        self.instructions.extend(instructions);
        self
    }

    /// Declare the signers without signing. Duplicates are dropped.
    pub fn set_signers(&mut self, signers: &[Pubkey]) {
        let mut unique: Vec<Pubkey> = Vec::with_capacity(signers.len());
        for signer in signers {
            if !unique.contains(signer) {
                unique.push(*signer);
            }
        }
        self.signatures = unique.into_iter().map(SignaturePubkeyPair::unsigned).collect();
    }

    fn inputs(&self) -> MessageInputs {
        MessageInputs {
            fee_payer: self.fee_payer,
            recent_blockhash: self.recent_blockhash,
            nonce_info: self.nonce_info.clone(),
            instructions: self.instructions.clone(),
            signers: self.signatures.iter().map(|pair| pair.public_key).collect(),
        }
    }

    /// Compile the instructions into a legacy message.
    ///
    /// The fee payer defaults to the first declared signer. Every declared
    /// signer must appear in the instructions; ones no instruction requires
    /// are promoted to signers with a warning.
    pub fn compile_message(&mut self) -> Result<Message, WasmSolanaError> {
        let inputs = self.inputs();
        if let Some((cached_inputs, message)) = &self.compiled {
            if *cached_inputs == inputs {
                return Ok(message.clone());
            }
        }

        let (recent_blockhash, instructions) = match &self.nonce_info {
            Some(nonce_info) => {
                let mut instructions = self.instructions.clone();
                if instructions.first() != Some(&nonce_info.nonce_instruction) {
                    instructions.insert(0, nonce_info.nonce_instruction.clone());
                }
                (Some(nonce_info.nonce), instructions)
            }
            None => (self.recent_blockhash, self.instructions.clone()),
        };
        let recent_blockhash = recent_blockhash.ok_or(CompileError::MissingBlockhash)?;
        if instructions.is_empty() {
            log::warn!("No instructions provided");
        }

        let fee_payer = self
            .fee_payer
            .or_else(|| self.signatures.first().map(|pair| pair.public_key))
            .ok_or(CompileError::MissingFeePayerKey)?;

        let mut compiled_keys = CompiledKeys::compile(&instructions, fee_payer);
        for pair in &self.signatures {
            if compiled_keys.mark_signer(&pair.public_key)? {
                log::warn!(
                    "Transaction references a signature that is unnecessary, only the fee payer \
                     and instruction signer accounts should sign a transaction: {}",
                    pair.public_key
                );
            }
        }
        let message = Message::from_compiled_keys(compiled_keys, &instructions, recent_blockhash)?;
        self.compiled = Some((inputs, message.clone()));
        Ok(message)
    }

    /// Compile, and reset the signature list if the signer set changed.
    fn compile(&mut self) -> Result<Message, WasmSolanaError> {
        let message = self.compile_message()?;
        let signed_keys = message.signer_keys();
        let unchanged = self.signatures.len() == signed_keys.len()
            && self
                .signatures
                .iter()
                .zip(signed_keys)
                .all(|(pair, key)| pair.public_key == *key);
        if !unchanged {
            if self.signatures.iter().any(|pair| pair.signature.is_some()) {
                log::debug!("Signer set changed; dropping existing signatures");
            }
            self.signatures = signed_keys
                .iter()
                .copied()
                .map(SignaturePubkeyPair::unsigned)
                .collect();
            // the signer list is part of the cache key
            self.compiled = Some((self.inputs(), message.clone()));
        }
        Ok(message)
    }

    /// The bytes that get signed.
    pub fn serialize_message(&mut self) -> Result<Vec<u8>, WasmSolanaError> {
        Ok(self.compile()?.serialize()?)
    }

    /// Sign with exactly `signers`, discarding any existing signatures.
    pub fn sign(&mut self, signers: &[&dyn Signer]) -> Result<(), WasmSolanaError> {
        let signers = unique_signers(signers)?;
        self.signatures = signers
            .iter()
            .map(|(pubkey, _)| SignaturePubkeyPair::unsigned(*pubkey))
            .collect();
        let message = self.compile()?;
        self.sign_compiled(&message, &signers)
    }

    /// Add signatures from `signers`, keeping any already present.
    pub fn partial_sign(&mut self, signers: &[&dyn Signer]) -> Result<(), WasmSolanaError> {
        let signers = unique_signers(signers)?;
        let message = self.compile()?;
        self.sign_compiled(&message, &signers)
    }

    fn sign_compiled(
        &mut self,
        message: &Message,
        signers: &[(Pubkey, &dyn Signer)],
    ) -> Result<(), WasmSolanaError> {
        let sign_data = message.serialize()?;
        for (pubkey, signer) in signers {
            let signature = signer
                .try_sign_message(&sign_data)
                .map_err(|e| WasmSolanaError::signer(pubkey, &e.to_string()))?;
            self.set_signature(pubkey, signature)?;
        }
        Ok(())
    }

    /// Attach an externally produced signature.
    pub fn add_signature(&mut self, pubkey: &Pubkey, signature: &[u8]) -> Result<(), WasmSolanaError> {
        self.compile()?;
        let bytes = <[u8; SIGNATURE_LENGTH]>::try_from(signature).map_err(|_| {
            WasmSolanaError::new(&format!(
                "Invalid signature length: expected 64 bytes, got {}",
                signature.len()
            ))
        })?;
        self.set_signature(pubkey, Signature::from(bytes))
    }

    fn set_signature(&mut self, pubkey: &Pubkey, signature: Signature) -> Result<(), WasmSolanaError> {
        let pair = self
            .signatures
            .iter_mut()
            .find(|pair| pair.public_key == *pubkey)
            .ok_or_else(|| WasmSolanaError::signer(pubkey, "unknown signer"))?;
        pair.signature = Some(signature);
        Ok(())
    }

    /// Index of `pubkey` among the required signers.
    pub fn signer_index(&self, pubkey: &Pubkey) -> Option<usize> {
        self.signatures.iter().position(|pair| pair.public_key == *pubkey)
    }

    /// Check every present signature; with `require_all`, a missing one fails too.
    pub fn verify_signatures(&mut self, require_all: bool) -> Result<bool, WasmSolanaError> {
        let sign_data = self.serialize_message()?;
        let (missing, invalid) = self.signature_errors(&sign_data);
        Ok(invalid.is_empty() && (!require_all || missing.is_empty()))
    }

    fn signature_errors(&self, sign_data: &[u8]) -> (Vec<Pubkey>, Vec<Pubkey>) {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();
        for pair in &self.signatures {
            match &pair.signature {
                None => missing.push(pair.public_key),
                Some(signature) => {
                    if !signature.verify(pair.public_key.as_ref(), sign_data) {
                        invalid.push(pair.public_key);
                    }
                }
            }
        }
        (missing, invalid)
    }

    /// Wire bytes: signatures (zeros where absent) followed by the message.
    pub fn serialize(&mut self, config: SerializeConfig) -> Result<Vec<u8>, WasmSolanaError> {
        let sign_data = self.serialize_message()?;
        if config.verify_signatures {
            let (missing, invalid) = self.signature_errors(&sign_data);
            let missing: Vec<Pubkey> = if config.require_all_signatures {
                missing
            } else {
                Vec::new()
            };
            if !missing.is_empty() || !invalid.is_empty() {
                let mut message = String::from("Signature verification failed.");
                if !invalid.is_empty() {
                    message.push_str(&format!(
                        "\nInvalid signature for public key(s) [{}].",
                        join_keys(&invalid)
                    ));
                }
                if !missing.is_empty() {
                    message.push_str(&format!(
                        "\nMissing signature for public key(s) [{}].",
                        join_keys(&missing)
                    ));
                }
                return Err(WasmSolanaError::new(&message));
            }
        }
        self.serialize_with(&sign_data)
    }

    fn serialize_with(&self, sign_data: &[u8]) -> Result<Vec<u8>, WasmSolanaError> {
        let signatures = Value::Seq(
            self.signatures
                .iter()
                .map(|pair| {
                    Value::Bytes(pair.signature.map_or_else(
                        || vec![0u8; SIGNATURE_LENGTH],
                        |s| s.as_ref().to_vec(),
                    ))
                })
                .collect(),
        );
        let mut wire = MessageSchema::signatures().encode_to_vec(&signatures)?;
        wire.extend_from_slice(sign_data);
        if wire.len() > PACKET_DATA_SIZE {
            return Err(WasmSolanaError::new(&format!(
                "Transaction too large: {} > {}",
                wire.len(),
                PACKET_DATA_SIZE
            )));
        }
        Ok(wire)
    }

    /// Parse wire bytes. The decoded message is kept so re-serializing
    /// reproduces the same bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Transaction, WasmSolanaError> {
        let (signatures, offset) = decode_signatures(bytes)?;
        let message = Message::deserialize(bytes.get(offset..).unwrap_or_default())
            .map_err(|e| WasmSolanaError::new(&format!("Failed to deserialize transaction: {}", e)))?;
        Self::populate(message, signatures)
    }

    pub fn from_base64(encoded: &str) -> Result<Transaction, WasmSolanaError> {
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| WasmSolanaError::new(&format!("Invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_base64(&mut self, config: SerializeConfig) -> Result<String, WasmSolanaError> {
        Ok(BASE64_STANDARD.encode(self.serialize(config)?))
    }

    /// Rebuild a transaction from a compiled message and its signatures.
    /// All-zero signatures count as absent.
    pub fn populate(message: Message, signatures: Vec<Signature>) -> Result<Transaction, WasmSolanaError> {
        let mut tx = Transaction {
            recent_blockhash: Some(message.recent_blockhash),
            ..Default::default()
        };
        if message.header.num_required_signatures > 0 {
            tx.fee_payer = message.account_keys.first().copied();
        }
        for (index, signature) in signatures.into_iter().enumerate() {
            let public_key = *message.account_keys.get(index).ok_or_else(|| {
                WasmSolanaError::new(&format!("signature {} has no matching account key", index))
            })?;
            tx.signatures.push(SignaturePubkeyPair {
                public_key,
                signature: (signature != Signature::default()).then_some(signature),
            });
        }

        for compiled in &message.instructions {
            let program_id = *message
                .account_keys
                .get(compiled.program_id_index as usize)
                .ok_or_else(|| {
                    WasmSolanaError::new(&format!(
                        "program id index {} out of range",
                        compiled.program_id_index
                    ))
                })?;
            let mut accounts = Vec::with_capacity(compiled.accounts.len());
            for &index in &compiled.accounts {
                let index = index as usize;
                let pubkey = *message.account_keys.get(index).ok_or_else(|| {
                    WasmSolanaError::new(&format!("account index {} out of range", index))
                })?;
                accounts.push(AccountMeta {
                    pubkey,
                    is_signer: message.is_account_signer(index),
                    is_writable: message.is_account_writable(index),
                });
            }
            tx.instructions
                .push(Instruction::new(program_id, accounts, compiled.data.clone()));
        }

        tx.compiled = Some((tx.inputs(), message));
        Ok(tx)
    }
}

fn unique_signers<'a>(
    signers: &[&'a dyn Signer],
) -> Result<Vec<(Pubkey, &'a dyn Signer)>, WasmSolanaError> {
    if signers.is_empty() {
        return Err(WasmSolanaError::new("No signers"));
    }
    let mut unique: Vec<(Pubkey, &'a dyn Signer)> = Vec::with_capacity(signers.len());
    for signer in signers {
        let pubkey = signer
            .try_pubkey()
            .map_err(|e| WasmSolanaError::new(&format!("Signer has no public key: {}", e)))?;
        if !unique.iter().any(|(seen, _)| *seen == pubkey) {
            unique.push((pubkey, *signer));
        }
    }
    Ok(unique)
}

/// Decode the leading signature array; returns the signatures and the
/// offset of the message.
pub(crate) fn decode_signatures(bytes: &[u8]) -> Result<(Vec<Signature>, usize), LayoutError> {
    let (value, used) = MessageSchema::signatures()
        .decode_with_span(bytes, 0)
        .map_err(|e| e.within("signatures"))?;
    let items = value.as_seq().ok_or_else(|| value.mismatch("sequence"))?;
    let signatures = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_bytes()
                .and_then(|b| <[u8; SIGNATURE_LENGTH]>::try_from(b).ok())
                .map(Signature::from)
                .ok_or_else(|| item.mismatch("64 bytes").within(format!("[{}]", i)).within("signatures"))
        })
        .collect::<Result<_, _>>()?;
    Ok((signatures, used))
}

fn join_keys(keys: &[Pubkey]) -> String {
    keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", ")
}

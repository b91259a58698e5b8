//! wasm-solana-wire: the Solana transaction wire format, in Rust and WASM.
//!
//! The crate encodes and decodes legacy and version-0 transactions without
//! depending on the Solana SDK's transaction crates. Only the value types
//! (`Pubkey`, `Hash`, `Signature`) and the ed25519 signer come from the
//! Solana 2.x crates.
//!
//! # Architecture
//!
//! 1. **Layout engine** (`layout`) - schema-driven binary codec with
//!    compact-u16 lengths, tagged unions and bit fields
//! 2. **Messages** (`message`) - account key compaction plus legacy and v0
//!    message compile/decompile
//! 3. **Transactions** (`transaction`, `versioned`) - signature envelope,
//!    signing, verification and serialization
//! 4. **Programs** (`instructions`, `address_lookup_table`) - instruction
//!    builders and decoders for the System, Compute Budget, Memo and
//!    Address Lookup Table programs
//! 5. **WASM bindings** (`wasm/`) - thin wrappers that expose the core types
//!    to JavaScript
//!
//! # Usage from Rust
//!
//! ```rust
//! use wasm_solana_wire::instructions::system;
//! use wasm_solana_wire::transaction::SerializeConfig;
//! use wasm_solana_wire::{Keypair, Transaction};
//! use solana_hash::Hash;
//! use solana_signer::Signer;
//!
//! let payer = Keypair::new();
//! let to = Keypair::new().pubkey();
//! let mut tx = Transaction::new(payer.pubkey(), Hash::new_from_array([1; 32]));
//! tx.add(system::transfer(&payer.pubkey(), &to, 1_000).unwrap());
//! tx.sign(&[&payer]).unwrap();
//! let bytes = tx.serialize(SerializeConfig::default()).unwrap();
//! assert_eq!(Transaction::from_bytes(&bytes).unwrap().signatures.len(), 1);
//! ```

pub mod address_lookup_table;
pub mod builder;
mod error;
pub mod instruction;
pub mod instructions;
pub mod keypair;
pub mod layout;
pub mod message;
mod parser;
pub mod pubkey;
pub mod transaction;
pub mod versioned;
pub mod wasm;

pub use error::{CompileError, DecompileError, FieldPath, LayoutError, WasmSolanaError};
pub use keypair::{Keypair, KeypairExt};
pub use parser::{
    parse_transaction, parse_transaction_with_lookup_tables, DurableNonce, ParsedTransaction,
};
pub use pubkey::{Pubkey, PubkeyExt};
pub use transaction::Transaction;
pub use versioned::{
    detect_transaction_version, AddressLookupTableData, TxVersion, VersionedTransaction,
};

pub use wasm::{
    is_versioned_transaction, BuilderNamespace, ParserNamespace, WasmAddressLookupTable,
    WasmKeypair, WasmPubkey, WasmTransaction, WasmVersionedTransaction,
};

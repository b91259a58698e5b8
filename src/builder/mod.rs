//! Transaction building module.
//!
//! - `build_transaction` creates an unsigned transaction from a high-level
//!   `TransactionIntent` (legacy, or v0 when lookup tables are given).
//! - `build_from_raw_versioned_data` serializes a pre-compiled v0 message.

mod build;
mod types;
mod versioned;

pub use build::build_transaction;
pub use types::{
    AddressLookupTable, Instruction, LookupTableContents, Nonce, RawMessageHeader,
    RawVersionedTransactionData, TransactionIntent, VersionedInstruction,
};
pub use versioned::build_from_raw_versioned_data;

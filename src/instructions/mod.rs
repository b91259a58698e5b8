//! Program instruction helpers: builders, data layouts and semantic decoding
//! for the System, ComputeBudget and Memo programs.

pub mod compute_budget;
mod decode;
pub mod memo;
pub mod nonce;
pub mod system;
mod try_into_js_value;
mod types;

pub(crate) use decode::{decode_instruction, InstructionContext};
pub use types::*;

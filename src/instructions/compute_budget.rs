//! ComputeBudget Program instructions.
//!
//! The ComputeBudget Program controls transaction compute limits and priority fees:
//! - Set compute unit limit
//! - Set compute unit price (priority fee)
//! - Request heap frame size
//!
//! # Wire Format
//!
//! The program defines its instructions as a borsh enum, so the data is a
//! single-byte variant index followed by the borsh fields:
//! - 0: Deprecated (RequestUnitsDeprecated)
//! - 1: RequestHeapFrame
//! - 2: SetComputeUnitLimit
//! - 3: SetComputeUnitPrice
//! - 4: SetLoadedAccountsDataSizeLimit

use super::types::COMPUTE_BUDGET_PROGRAM_ID;
use crate::error::WasmSolanaError;
use crate::instruction::Instruction;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_pubkey::Pubkey;

/// ComputeBudget Program ID
pub const ID: Pubkey = Pubkey::from_str_const(COMPUTE_BUDGET_PROGRAM_ID);

/// ComputeBudget instruction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBudgetInstructionType {
    /// Deprecated instruction.
    RequestUnitsDeprecated,
    /// Request a specific heap frame size.
    RequestHeapFrame,
    /// Set the compute unit limit for the transaction.
    SetComputeUnitLimit,
    /// Set the compute unit price (priority fee).
    SetComputeUnitPrice,
    /// Set the maximum loaded accounts data size.
    SetLoadedAccountsDataSizeLimit,
}

impl ComputeBudgetInstructionType {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestUnitsDeprecated => "RequestUnitsDeprecated",
            Self::RequestHeapFrame => "RequestHeapFrame",
            Self::SetComputeUnitLimit => "SetComputeUnitLimit",
            Self::SetComputeUnitPrice => "SetComputeUnitPrice",
            Self::SetLoadedAccountsDataSizeLimit => "SetLoadedAccountsDataSizeLimit",
        }
    }
}

/// ComputeBudget instruction, in the program's own borsh layout.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ComputeBudgetInstruction {
    /// Deprecated: Request units (replaced by SetComputeUnitLimit).
    RequestUnitsDeprecated { units: u32, additional_fee: u32 },

    /// Request a specific heap frame size.
    /// Accounts: none
    RequestHeapFrame {
        /// Heap size in bytes (must be multiple of 1024).
        bytes: u32,
    },

    /// Set the compute unit limit for the transaction.
    /// Accounts: none
    SetComputeUnitLimit { units: u32 },

    /// Set the compute unit price (priority fee per compute unit).
    /// Accounts: none
    SetComputeUnitPrice {
        /// Price in micro-lamports per compute unit.
        micro_lamports: u64,
    },

    /// Set the maximum loaded accounts data size limit.
    /// Accounts: none
    SetLoadedAccountsDataSizeLimit { bytes: u32 },
}

impl ComputeBudgetInstruction {
    /// Check if the given program ID is the ComputeBudget Program.
    pub fn is_compute_budget_program(program_id: &str) -> bool {
        program_id == COMPUTE_BUDGET_PROGRAM_ID
    }

    /// Decode a ComputeBudget Program instruction from raw data.
    pub fn decode(data: &[u8]) -> Result<Self, WasmSolanaError> {
        if data.is_empty() {
            return Err(WasmSolanaError::new(
                "ComputeBudget instruction empty: need at least 1 byte",
            ));
        }
        // Reading from a slice stops after the payload; extra bytes are ignored.
        Self::deserialize(&mut &data[..]).map_err(|e| {
            WasmSolanaError::new(&format!("Failed to decode ComputeBudget instruction: {}", e))
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, WasmSolanaError> {
        borsh::to_vec(self).map_err(|e| {
            WasmSolanaError::new(&format!("Failed to encode ComputeBudget instruction: {}", e))
        })
    }

    /// Get the instruction type.
    pub fn instruction_type(&self) -> ComputeBudgetInstructionType {
        match self {
            Self::RequestUnitsDeprecated { .. } => {
                ComputeBudgetInstructionType::RequestUnitsDeprecated
            }
            Self::RequestHeapFrame { .. } => ComputeBudgetInstructionType::RequestHeapFrame,
            Self::SetComputeUnitLimit { .. } => ComputeBudgetInstructionType::SetComputeUnitLimit,
            Self::SetComputeUnitPrice { .. } => ComputeBudgetInstructionType::SetComputeUnitPrice,
            Self::SetLoadedAccountsDataSizeLimit { .. } => {
                ComputeBudgetInstructionType::SetLoadedAccountsDataSizeLimit
            }
        }
    }

    /// Get the compute unit limit if this is a SetComputeUnitLimit instruction.
    pub fn compute_unit_limit(&self) -> Option<u32> {
        match self {
            Self::SetComputeUnitLimit { units } => Some(*units),
            _ => None,
        }
    }

    /// Get the compute unit price in micro-lamports if this is a SetComputeUnitPrice instruction.
    pub fn compute_unit_price(&self) -> Option<u64> {
        match self {
            Self::SetComputeUnitPrice { micro_lamports } => Some(*micro_lamports),
            _ => None,
        }
    }

    /// Wrap into an instruction for the ComputeBudget Program. No accounts.
    pub fn to_instruction(&self) -> Result<Instruction, WasmSolanaError> {
        Ok(Instruction::new(ID, vec![], self.encode()?))
    }
}

pub fn set_compute_unit_limit(units: u32) -> Result<Instruction, WasmSolanaError> {
    ComputeBudgetInstruction::SetComputeUnitLimit { units }.to_instruction()
}

pub fn set_compute_unit_price(micro_lamports: u64) -> Result<Instruction, WasmSolanaError> {
    ComputeBudgetInstruction::SetComputeUnitPrice { micro_lamports }.to_instruction()
}

pub fn request_heap_frame(bytes: u32) -> Result<Instruction, WasmSolanaError> {
    ComputeBudgetInstruction::RequestHeapFrame { bytes }.to_instruction()
}

pub fn set_loaded_accounts_data_size_limit(bytes: u32) -> Result<Instruction, WasmSolanaError> {
    ComputeBudgetInstruction::SetLoadedAccountsDataSizeLimit { bytes }.to_instruction()
}

//! Parsed instruction types returned by `parse_transaction`.
//!
//! These types are designed to convert directly to JavaScript values
//! using TryIntoJsValue.

/// Program IDs as base58 strings.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";
pub const COMPUTE_BUDGET_PROGRAM_ID: &str = "ComputeBudget111111111111111111111111111111";
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";
pub const ADDRESS_LOOKUP_TABLE_PROGRAM_ID: &str = "AddressLookupTab1e1111111111111111111111111";

/// Sysvar Recent Blockhashes address.
/// Required for NonceAdvance instruction to verify the nonce account's stored blockhash.
pub const SYSVAR_RECENT_BLOCKHASHES: &str = "SysvarRecentB1ockHashes11111111111111111111";
pub const SYSVAR_RENT: &str = "SysvarRent111111111111111111111111111111111";

/// A parsed instruction with type discriminant and params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInstruction {
    // System Program instructions
    Transfer(TransferParams),
    CreateAccount(CreateAccountParams),
    Assign(AssignParams),
    Allocate(AllocateParams),
    NonceAdvance(NonceAdvanceParams),
    /// Second half of a nonce account creation (after CreateAccount)
    NonceInitialize(NonceInitializeParams),
    NonceWithdraw(NonceWithdrawParams),
    NonceAuthorize(NonceAuthorizeParams),

    // ComputeBudget instructions
    SetComputeUnitLimit(SetComputeUnitLimitParams),
    SetPriorityFee(SetPriorityFeeParams),

    // Memo
    Memo(MemoParams),

    // Address Lookup Table instructions
    CreateLookupTable(CreateLookupTableParams),
    ExtendLookupTable(ExtendLookupTableParams),
    FreezeLookupTable(LookupTableAuthorityParams),
    DeactivateLookupTable(LookupTableAuthorityParams),
    CloseLookupTable(CloseLookupTableParams),

    // Fallback for unknown/custom instructions
    Unknown(UnknownInstructionParams),
}

// =============================================================================
// System Program Params
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub from_address: String,
    pub to_address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountParams {
    pub from_address: String,
    pub new_address: String,
    pub amount: u64,
    pub space: u64,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignParams {
    pub account_address: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocateParams {
    pub account_address: String,
    pub space: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceAdvanceParams {
    pub wallet_nonce_address: String,
    pub auth_wallet_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceInitializeParams {
    pub nonce_address: String,
    pub auth_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceWithdrawParams {
    pub nonce_address: String,
    pub to_address: String,
    pub auth_address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceAuthorizeParams {
    pub nonce_address: String,
    pub auth_address: String,
    pub new_auth_address: String,
}

// =============================================================================
// ComputeBudget Params
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetComputeUnitLimitParams {
    pub units: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPriorityFeeParams {
    pub fee: u64,
}

// =============================================================================
// Address Lookup Table Params
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLookupTableParams {
    pub table_address: String,
    pub authority_address: String,
    pub payer_address: String,
    pub recent_slot: u64,
    pub bump_seed: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendLookupTableParams {
    pub table_address: String,
    pub authority_address: String,
    pub payer_address: Option<String>,
    pub addresses: Vec<String>,
}

/// Freeze and Deactivate carry only the table and its authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTableAuthorityParams {
    pub table_address: String,
    pub authority_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseLookupTableParams {
    pub table_address: String,
    pub authority_address: String,
    pub recipient_address: String,
}

// =============================================================================
// Memo & Unknown
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoParams {
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInstructionParams {
    pub program_id: String,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Account reference with flags recovered from the message header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

//! System Program instructions.
//!
//! The System Program is responsible for:
//! - Creating new accounts
//! - Allocating account data
//! - Assigning accounts to programs
//! - Transferring lamports
//! - Nonce account operations
//!
//! # Wire Format
//!
//! System instructions start with a 4-byte little-endian discriminator:
//! - 0: CreateAccount
//! - 1: Assign
//! - 2: Transfer
//! - 3: CreateAccountWithSeed
//! - 4: AdvanceNonceAccount
//! - 5: WithdrawNonceAccount
//! - 6: InitializeNonceAccount
//! - 7: AuthorizeNonceAccount
//! - 8: Allocate
//! - 9: AllocateWithSeed
//! - 10: AssignWithSeed
//! - 11: TransferWithSeed
//! - 12: UpgradeNonceAccount
//!
//! Seeds are bincode strings (u64 length, then UTF-8 bytes).

use super::nonce::NONCE_ACCOUNT_LENGTH;
use super::types::{SYSTEM_PROGRAM_ID, SYSVAR_RECENT_BLOCKHASHES, SYSVAR_RENT};
use crate::error::{LayoutError, WasmSolanaError};
use crate::instruction::{AccountMeta, Instruction};
use crate::layout::{Field, Fields, IntLayout, Layout, Union, Value};
use solana_pubkey::Pubkey;
use std::sync::OnceLock;

/// System Program ID.
pub const ID: Pubkey = Pubkey::from_str_const(SYSTEM_PROGRAM_ID);
pub const RECENT_BLOCKHASHES_SYSVAR_ID: Pubkey = Pubkey::from_str_const(SYSVAR_RECENT_BLOCKHASHES);
pub const RENT_SYSVAR_ID: Pubkey = Pubkey::from_str_const(SYSVAR_RENT);

/// System instruction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemInstructionType {
    CreateAccount,
    Assign,
    Transfer,
    CreateAccountWithSeed,
    AdvanceNonceAccount,
    WithdrawNonceAccount,
    InitializeNonceAccount,
    AuthorizeNonceAccount,
    Allocate,
    AllocateWithSeed,
    AssignWithSeed,
    TransferWithSeed,
    UpgradeNonceAccount,
}

impl SystemInstructionType {
    const ALL: [SystemInstructionType; 13] = [
        Self::CreateAccount,
        Self::Assign,
        Self::Transfer,
        Self::CreateAccountWithSeed,
        Self::AdvanceNonceAccount,
        Self::WithdrawNonceAccount,
        Self::InitializeNonceAccount,
        Self::AuthorizeNonceAccount,
        Self::Allocate,
        Self::AllocateWithSeed,
        Self::AssignWithSeed,
        Self::TransferWithSeed,
        Self::UpgradeNonceAccount,
    ];

    /// Get the string representation of this instruction type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateAccount => "CreateAccount",
            Self::Assign => "Assign",
            Self::Transfer => "Transfer",
            Self::CreateAccountWithSeed => "CreateAccountWithSeed",
            Self::AdvanceNonceAccount => "AdvanceNonceAccount",
            Self::WithdrawNonceAccount => "WithdrawNonceAccount",
            Self::InitializeNonceAccount => "InitializeNonceAccount",
            Self::AuthorizeNonceAccount => "AuthorizeNonceAccount",
            Self::Allocate => "Allocate",
            Self::AllocateWithSeed => "AllocateWithSeed",
            Self::AssignWithSeed => "AssignWithSeed",
            Self::TransferWithSeed => "TransferWithSeed",
            Self::UpgradeNonceAccount => "UpgradeNonceAccount",
        }
    }

    /// On-chain discriminator.
    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Union variant name of this instruction's payload.
    fn property(&self) -> &'static str {
        match self {
            Self::CreateAccount => "create",
            Self::Assign => "assign",
            Self::Transfer => "transfer",
            Self::CreateAccountWithSeed => "createWithSeed",
            Self::AdvanceNonceAccount => "advanceNonceAccount",
            Self::WithdrawNonceAccount => "withdrawNonceAccount",
            Self::InitializeNonceAccount => "initializeNonceAccount",
            Self::AuthorizeNonceAccount => "authorizeNonceAccount",
            Self::Allocate => "allocate",
            Self::AllocateWithSeed => "allocateWithSeed",
            Self::AssignWithSeed => "assignWithSeed",
            Self::TransferWithSeed => "transferWithSeed",
            Self::UpgradeNonceAccount => "upgradeNonceAccount",
        }
    }

    fn payload_layout(&self) -> Layout {
        let field = Field::new;
        let fields = match self {
            Self::CreateAccount => vec![
                field("lamports", Layout::u64()),
                field("space", Layout::u64()),
                field("programId", Layout::public_key()),
            ],
            Self::Assign => vec![field("programId", Layout::public_key())],
            Self::Transfer | Self::WithdrawNonceAccount => {
                vec![field("lamports", Layout::u64())]
            }
            Self::CreateAccountWithSeed => vec![
                field("base", Layout::public_key()),
                field("seed", Layout::rust_string()),
                field("lamports", Layout::u64()),
                field("space", Layout::u64()),
                field("programId", Layout::public_key()),
            ],
            Self::AdvanceNonceAccount | Self::UpgradeNonceAccount => vec![],
            Self::InitializeNonceAccount | Self::AuthorizeNonceAccount => {
                vec![field("authorized", Layout::public_key())]
            }
            Self::Allocate => vec![field("space", Layout::u64())],
            Self::AllocateWithSeed => vec![
                field("base", Layout::public_key()),
                field("seed", Layout::rust_string()),
                field("space", Layout::u64()),
                field("programId", Layout::public_key()),
            ],
            Self::AssignWithSeed => vec![
                field("base", Layout::public_key()),
                field("seed", Layout::rust_string()),
                field("programId", Layout::public_key()),
            ],
            Self::TransferWithSeed => vec![
                field("lamports", Layout::u64()),
                field("seed", Layout::rust_string()),
                field("programId", Layout::public_key()),
            ],
        };
        Layout::structure(fields)
    }
}

fn build_layout() -> Result<Layout, LayoutError> {
    let mut union = Union::new(IntLayout::U32).with_discriminant_property("instruction");
    for kind in SystemInstructionType::ALL {
        union = union.add_variant(kind.index() as u64, kind.property(), kind.payload_layout())?;
    }
    Ok(Layout::Union(union))
}

/// System instruction data layout.
pub fn instruction_layout() -> Result<&'static Layout, LayoutError> {
    static LAYOUT: OnceLock<Result<Layout, LayoutError>> = OnceLock::new();
    LAYOUT.get_or_init(build_layout).as_ref().map_err(Clone::clone)
}

/// Decoded System Program instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemInstruction {
    /// Create a new account.
    /// Accounts: [funding_account, new_account]
    CreateAccount {
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },

    /// Assign account to a program.
    /// Accounts: [assigned_account]
    Assign { owner: Pubkey },

    /// Transfer lamports.
    /// Accounts: [from, to]
    Transfer { lamports: u64 },

    /// Create a new account at an address derived from seed.
    /// Accounts: [funding_account, created_account, base_account (optional)]
    CreateAccountWithSeed {
        base: Pubkey,
        seed: String,
        lamports: u64,
        space: u64,
        owner: Pubkey,
    },

    /// Advance the nonce in a nonce account.
    /// Accounts: [nonce_account, recent_blockhashes_sysvar, nonce_authority]
    AdvanceNonceAccount,

    /// Withdraw funds from a nonce account.
    /// Accounts: [nonce_account, to_account, recent_blockhashes_sysvar, rent_sysvar, nonce_authority]
    WithdrawNonceAccount { lamports: u64 },

    /// Initialize a nonce account.
    /// Accounts: [nonce_account, recent_blockhashes_sysvar, rent_sysvar]
    InitializeNonceAccount { authorized: Pubkey },

    /// Authorize a new entity to execute nonce instructions.
    /// Accounts: [nonce_account, nonce_authority]
    AuthorizeNonceAccount { authorized: Pubkey },

    /// Allocate space for an account without funding.
    /// Accounts: [new_account]
    Allocate { space: u64 },

    /// Allocate space for an account at a derived address.
    /// Accounts: [allocated_account, base_account]
    AllocateWithSeed {
        base: Pubkey,
        seed: String,
        space: u64,
        owner: Pubkey,
    },

    /// Assign a derived-address account to a program.
    /// Accounts: [assigned_account, base_account]
    AssignWithSeed {
        base: Pubkey,
        seed: String,
        owner: Pubkey,
    },

    /// Transfer lamports from a derived address.
    /// Accounts: [from, base, to]
    TransferWithSeed {
        lamports: u64,
        from_seed: String,
        from_owner: Pubkey,
    },

    /// One-time upgrade of a legacy nonce account.
    /// Accounts: [nonce_account]
    UpgradeNonceAccount,
}

impl SystemInstruction {
    /// Check if the given program ID is the System Program.
    pub fn is_system_program(program_id: &str) -> bool {
        program_id == SYSTEM_PROGRAM_ID
    }

    pub fn instruction_type(&self) -> SystemInstructionType {
        match self {
            Self::CreateAccount { .. } => SystemInstructionType::CreateAccount,
            Self::Assign { .. } => SystemInstructionType::Assign,
            Self::Transfer { .. } => SystemInstructionType::Transfer,
            Self::CreateAccountWithSeed { .. } => SystemInstructionType::CreateAccountWithSeed,
            Self::AdvanceNonceAccount => SystemInstructionType::AdvanceNonceAccount,
            Self::WithdrawNonceAccount { .. } => SystemInstructionType::WithdrawNonceAccount,
            Self::InitializeNonceAccount { .. } => SystemInstructionType::InitializeNonceAccount,
            Self::AuthorizeNonceAccount { .. } => SystemInstructionType::AuthorizeNonceAccount,
            Self::Allocate { .. } => SystemInstructionType::Allocate,
            Self::AllocateWithSeed { .. } => SystemInstructionType::AllocateWithSeed,
            Self::AssignWithSeed { .. } => SystemInstructionType::AssignWithSeed,
            Self::TransferWithSeed { .. } => SystemInstructionType::TransferWithSeed,
            Self::UpgradeNonceAccount => SystemInstructionType::UpgradeNonceAccount,
        }
    }

    fn payload(&self) -> Fields {
        match self {
            Self::CreateAccount {
                lamports,
                space,
                owner,
            } => Fields::new()
                .with("lamports", *lamports)
                .with("space", *space)
                .with("programId", *owner),
            Self::Assign { owner } => Fields::new().with("programId", *owner),
            Self::Transfer { lamports } | Self::WithdrawNonceAccount { lamports } => {
                Fields::new().with("lamports", *lamports)
            }
            Self::CreateAccountWithSeed {
                base,
                seed,
                lamports,
                space,
                owner,
            } => Fields::new()
                .with("base", *base)
                .with("seed", seed.as_str())
                .with("lamports", *lamports)
                .with("space", *space)
                .with("programId", *owner),
            Self::AdvanceNonceAccount | Self::UpgradeNonceAccount => Fields::new(),
            Self::InitializeNonceAccount { authorized }
            | Self::AuthorizeNonceAccount { authorized } => {
                Fields::new().with("authorized", *authorized)
            }
            Self::Allocate { space } => Fields::new().with("space", *space),
            Self::AllocateWithSeed {
                base,
                seed,
                space,
                owner,
            } => Fields::new()
                .with("base", *base)
                .with("seed", seed.as_str())
                .with("space", *space)
                .with("programId", *owner),
            Self::AssignWithSeed { base, seed, owner } => Fields::new()
                .with("base", *base)
                .with("seed", seed.as_str())
                .with("programId", *owner),
            Self::TransferWithSeed {
                lamports,
                from_seed,
                from_owner,
            } => Fields::new()
                .with("lamports", *lamports)
                .with("seed", from_seed.as_str())
                .with("programId", *from_owner),
        }
    }

    /// Encode to instruction data.
    pub fn encode(&self) -> Result<Vec<u8>, LayoutError> {
        let value = Value::variant(
            self.instruction_type().index() as u64,
            Value::Struct(self.payload()),
        );
        instruction_layout()?.encode_to_vec(&value)
    }

    /// Decode a System Program instruction from raw data.
    pub fn decode(data: &[u8]) -> Result<Self, WasmSolanaError> {
        // Bytes past the payload are ignored, as the runtime does.
        let value = instruction_layout()?.decode(data, 0)?;
        let variant = value.as_variant().ok_or_else(|| value.mismatch("variant"))?;
        let kind = SystemInstructionType::ALL
            .get(variant.discriminant as usize)
            .copied()
            .ok_or_else(|| {
                WasmSolanaError::new(&format!(
                    "Unknown System instruction discriminator: {}",
                    variant.discriminant
                ))
            })?;
        let p = variant
            .payload
            .as_struct()
            .ok_or_else(|| variant.payload.mismatch("struct"))?;
        let seed = |p: &Fields| p.str("seed").map(str::to_string);

        let instruction = match kind {
            SystemInstructionType::CreateAccount => Self::CreateAccount {
                lamports: p.u64("lamports")?,
                space: p.u64("space")?,
                owner: p.pubkey("programId")?,
            },
            SystemInstructionType::Assign => Self::Assign {
                owner: p.pubkey("programId")?,
            },
            SystemInstructionType::Transfer => Self::Transfer {
                lamports: p.u64("lamports")?,
            },
            SystemInstructionType::CreateAccountWithSeed => Self::CreateAccountWithSeed {
                base: p.pubkey("base")?,
                seed: seed(p)?,
                lamports: p.u64("lamports")?,
                space: p.u64("space")?,
                owner: p.pubkey("programId")?,
            },
            SystemInstructionType::AdvanceNonceAccount => Self::AdvanceNonceAccount,
            SystemInstructionType::WithdrawNonceAccount => Self::WithdrawNonceAccount {
                lamports: p.u64("lamports")?,
            },
            SystemInstructionType::InitializeNonceAccount => Self::InitializeNonceAccount {
                authorized: p.pubkey("authorized")?,
            },
            SystemInstructionType::AuthorizeNonceAccount => Self::AuthorizeNonceAccount {
                authorized: p.pubkey("authorized")?,
            },
            SystemInstructionType::Allocate => Self::Allocate {
                space: p.u64("space")?,
            },
            SystemInstructionType::AllocateWithSeed => Self::AllocateWithSeed {
                base: p.pubkey("base")?,
                seed: seed(p)?,
                space: p.u64("space")?,
                owner: p.pubkey("programId")?,
            },
            SystemInstructionType::AssignWithSeed => Self::AssignWithSeed {
                base: p.pubkey("base")?,
                seed: seed(p)?,
                owner: p.pubkey("programId")?,
            },
            SystemInstructionType::TransferWithSeed => Self::TransferWithSeed {
                lamports: p.u64("lamports")?,
                from_seed: seed(p)?,
                from_owner: p.pubkey("programId")?,
            },
            SystemInstructionType::UpgradeNonceAccount => Self::UpgradeNonceAccount,
        };
        Ok(instruction)
    }

    fn into_instruction(self, accounts: Vec<AccountMeta>) -> Result<Instruction, LayoutError> {
        Ok(Instruction::new(ID, accounts, self.encode()?))
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<Instruction, LayoutError> {
    SystemInstruction::Transfer { lamports }.into_instruction(vec![
        AccountMeta::new(*from, true),
        AccountMeta::new(*to, false),
    ])
}

pub fn create_account(
    from: &Pubkey,
    new_account: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Result<Instruction, LayoutError> {
    SystemInstruction::CreateAccount {
        lamports,
        space,
        owner: *owner,
    }
    .into_instruction(vec![
        AccountMeta::new(*from, true),
        AccountMeta::new(*new_account, true),
    ])
}

/// The base account signs only when it differs from the funder.
pub fn create_account_with_seed(
    from: &Pubkey,
    to: &Pubkey,
    base: &Pubkey,
    seed: &str,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Result<Instruction, LayoutError> {
    let mut accounts = vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)];
    if base != from {
        accounts.push(AccountMeta::new_readonly(*base, true));
    }
    SystemInstruction::CreateAccountWithSeed {
        base: *base,
        seed: seed.to_string(),
        lamports,
        space,
        owner: *owner,
    }
    .into_instruction(accounts)
}

pub fn assign(account: &Pubkey, owner: &Pubkey) -> Result<Instruction, LayoutError> {
    SystemInstruction::Assign { owner: *owner }
        .into_instruction(vec![AccountMeta::new(*account, true)])
}

pub fn allocate(account: &Pubkey, space: u64) -> Result<Instruction, LayoutError> {
    SystemInstruction::Allocate { space }.into_instruction(vec![AccountMeta::new(*account, true)])
}

pub fn advance_nonce_account(
    nonce_account: &Pubkey,
    authorized: &Pubkey,
) -> Result<Instruction, LayoutError> {
    SystemInstruction::AdvanceNonceAccount.into_instruction(vec![
        AccountMeta::new(*nonce_account, false),
        AccountMeta::new_readonly(RECENT_BLOCKHASHES_SYSVAR_ID, false),
        AccountMeta::new_readonly(*authorized, true),
    ])
}

pub fn withdraw_nonce_account(
    nonce_account: &Pubkey,
    authorized: &Pubkey,
    to: &Pubkey,
    lamports: u64,
) -> Result<Instruction, LayoutError> {
    SystemInstruction::WithdrawNonceAccount { lamports }.into_instruction(vec![
        AccountMeta::new(*nonce_account, false),
        AccountMeta::new(*to, false),
        AccountMeta::new_readonly(RECENT_BLOCKHASHES_SYSVAR_ID, false),
        AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        AccountMeta::new_readonly(*authorized, true),
    ])
}

pub fn initialize_nonce_account(
    nonce_account: &Pubkey,
    authorized: &Pubkey,
) -> Result<Instruction, LayoutError> {
    SystemInstruction::InitializeNonceAccount {
        authorized: *authorized,
    }
    .into_instruction(vec![
        AccountMeta::new(*nonce_account, false),
        AccountMeta::new_readonly(RECENT_BLOCKHASHES_SYSVAR_ID, false),
        AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
    ])
}

pub fn authorize_nonce_account(
    nonce_account: &Pubkey,
    authorized: &Pubkey,
    new_authorized: &Pubkey,
) -> Result<Instruction, LayoutError> {
    SystemInstruction::AuthorizeNonceAccount {
        authorized: *new_authorized,
    }
    .into_instruction(vec![
        AccountMeta::new(*nonce_account, false),
        AccountMeta::new_readonly(*authorized, true),
    ])
}

/// CreateAccount sized for nonce data, followed by InitializeNonceAccount.
pub fn create_nonce_account(
    from: &Pubkey,
    nonce_account: &Pubkey,
    authorized: &Pubkey,
    lamports: u64,
) -> Result<Vec<Instruction>, LayoutError> {
    Ok(vec![
        create_account(
            from,
            nonce_account,
            lamports,
            NONCE_ACCOUNT_LENGTH as u64,
            &ID,
        )?,
        initialize_nonce_account(nonce_account, authorized)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    /// The on-chain program's own bincode encoding, for cross-checking.
    #[derive(Serialize)]
    enum BincodeSystemInstruction {
        CreateAccount {
            lamports: u64,
            space: u64,
            owner: [u8; 32],
        },
        Assign {
            owner: [u8; 32],
        },
        Transfer {
            lamports: u64,
        },
        CreateAccountWithSeed {
            base: [u8; 32],
            seed: String,
            lamports: u64,
            space: u64,
            owner: [u8; 32],
        },
        AdvanceNonceAccount,
        WithdrawNonceAccount(u64),
        InitializeNonceAccount([u8; 32]),
        AuthorizeNonceAccount([u8; 32]),
        Allocate {
            space: u64,
        },
        AllocateWithSeed {
            base: [u8; 32],
            seed: String,
            space: u64,
            owner: [u8; 32],
        },
        AssignWithSeed {
            base: [u8; 32],
            seed: String,
            owner: [u8; 32],
        },
        TransferWithSeed {
            lamports: u64,
            from_seed: String,
            from_owner: [u8; 32],
        },
        UpgradeNonceAccount,
    }

    #[test]
    fn test_decode_transfer() {
        // Transfer 100000 lamports (discriminator 2 + u64 lamports)
        let data = [
            2, 0, 0, 0, // discriminator = 2 (Transfer)
            160, 134, 1, 0, 0, 0, 0, 0, // lamports = 100000
        ];

        let instr = SystemInstruction::decode(&data).unwrap();
        match instr {
            SystemInstruction::Transfer { lamports } => {
                assert_eq!(lamports, 100000);
            }
            _ => panic!("Expected Transfer instruction"),
        }
    }

    #[test]
    fn test_decode_advance_nonce() {
        let data = [4, 0, 0, 0]; // discriminator = 4 (AdvanceNonceAccount)

        let instr = SystemInstruction::decode(&data).unwrap();
        assert!(matches!(instr, SystemInstruction::AdvanceNonceAccount));
    }

    #[test]
    fn test_encode_matches_bincode() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let cases = vec![
            (
                SystemInstruction::CreateAccount {
                    lamports: 1_000_000,
                    space: 80,
                    owner: a,
                },
                BincodeSystemInstruction::CreateAccount {
                    lamports: 1_000_000,
                    space: 80,
                    owner: a.to_bytes(),
                },
            ),
            (
                SystemInstruction::Assign { owner: a },
                BincodeSystemInstruction::Assign { owner: a.to_bytes() },
            ),
            (
                SystemInstruction::Transfer { lamports: 5000 },
                BincodeSystemInstruction::Transfer { lamports: 5000 },
            ),
            (
                SystemInstruction::CreateAccountWithSeed {
                    base: a,
                    seed: "vault:0".to_string(),
                    lamports: 7,
                    space: 200,
                    owner: b,
                },
                BincodeSystemInstruction::CreateAccountWithSeed {
                    base: a.to_bytes(),
                    seed: "vault:0".to_string(),
                    lamports: 7,
                    space: 200,
                    owner: b.to_bytes(),
                },
            ),
            (
                SystemInstruction::AdvanceNonceAccount,
                BincodeSystemInstruction::AdvanceNonceAccount,
            ),
            (
                SystemInstruction::WithdrawNonceAccount { lamports: 9 },
                BincodeSystemInstruction::WithdrawNonceAccount(9),
            ),
            (
                SystemInstruction::InitializeNonceAccount { authorized: b },
                BincodeSystemInstruction::InitializeNonceAccount(b.to_bytes()),
            ),
            (
                SystemInstruction::AuthorizeNonceAccount { authorized: a },
                BincodeSystemInstruction::AuthorizeNonceAccount(a.to_bytes()),
            ),
            (
                SystemInstruction::Allocate { space: 165 },
                BincodeSystemInstruction::Allocate { space: 165 },
            ),
            (
                SystemInstruction::AllocateWithSeed {
                    base: b,
                    seed: "seed".to_string(),
                    space: 1,
                    owner: a,
                },
                BincodeSystemInstruction::AllocateWithSeed {
                    base: b.to_bytes(),
                    seed: "seed".to_string(),
                    space: 1,
                    owner: a.to_bytes(),
                },
            ),
            (
                SystemInstruction::AssignWithSeed {
                    base: a,
                    seed: String::new(),
                    owner: b,
                },
                BincodeSystemInstruction::AssignWithSeed {
                    base: a.to_bytes(),
                    seed: String::new(),
                    owner: b.to_bytes(),
                },
            ),
            (
                SystemInstruction::TransferWithSeed {
                    lamports: 3,
                    from_seed: "x".to_string(),
                    from_owner: b,
                },
                BincodeSystemInstruction::TransferWithSeed {
                    lamports: 3,
                    from_seed: "x".to_string(),
                    from_owner: b.to_bytes(),
                },
            ),
            (
                SystemInstruction::UpgradeNonceAccount,
                BincodeSystemInstruction::UpgradeNonceAccount,
            ),
        ];

        for (instruction, mirror) in cases {
            let expected = bincode::serialize(&mirror).unwrap();
            let encoded = instruction.encode().unwrap();
            assert_eq!(encoded, expected, "{}", instruction.instruction_type().as_str());
            assert_eq!(SystemInstruction::decode(&encoded).unwrap(), instruction);
        }
    }

    #[test]
    fn test_decode_rejects_bad_data() {
        assert!(SystemInstruction::decode(&[13, 0, 0, 0]).is_err());
        assert!(SystemInstruction::decode(&[2, 0, 0, 0, 1]).is_err());
        let err = SystemInstruction::decode(&[0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
        assert!(err.to_string().starts_with("create.space"), "{}", err);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut data = vec![2, 0, 0, 0];
        data.extend_from_slice(&1000u64.to_le_bytes());
        data.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(
            SystemInstruction::decode(&data).unwrap(),
            SystemInstruction::Transfer { lamports: 1000 }
        );
        assert_eq!(
            SystemInstruction::decode(&[4, 0, 0, 0, 0]).unwrap(),
            SystemInstruction::AdvanceNonceAccount
        );
    }

    #[test]
    fn test_transfer_builder() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let ix = transfer(&from, &to, 1000).unwrap();
        assert_eq!(ix.program_id, ID);
        assert_eq!(
            ix.accounts,
            vec![AccountMeta::new(from, true), AccountMeta::new(to, false)]
        );
        let mut data = vec![2, 0, 0, 0];
        data.extend_from_slice(&1000u64.to_le_bytes());
        assert_eq!(ix.data, data);
    }

    #[test]
    fn test_nonce_builders() {
        let nonce = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let ix = advance_nonce_account(&nonce, &authority).unwrap();
        assert_eq!(ix.data, vec![4, 0, 0, 0]);
        assert_eq!(ix.accounts[1].pubkey, RECENT_BLOCKHASHES_SYSVAR_ID);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);

        let ixs = create_nonce_account(&Pubkey::new_unique(), &nonce, &authority, 1_447_680).unwrap();
        assert_eq!(ixs.len(), 2);
        assert_eq!(
            SystemInstruction::decode(&ixs[0].data).unwrap(),
            SystemInstruction::CreateAccount {
                lamports: 1_447_680,
                space: 80,
                owner: ID
            }
        );
        assert_eq!(ixs[1].accounts[2].pubkey, RENT_SYSVAR_ID);
    }

    #[test]
    fn test_create_account_with_seed_base_signer() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let ix = create_account_with_seed(&from, &to, &from, "s", 1, 0, &ID).unwrap();
        assert_eq!(ix.accounts.len(), 2);
        let base = Pubkey::new_unique();
        let ix = create_account_with_seed(&from, &to, &base, "s", 1, 0, &ID).unwrap();
        assert_eq!(ix.accounts[2], AccountMeta::new_readonly(base, true));
    }

    #[test]
    fn test_is_system_program() {
        assert!(SystemInstruction::is_system_program(SYSTEM_PROGRAM_ID));
        assert!(!SystemInstruction::is_system_program(
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        ));
    }

    #[test]
    fn test_instruction_type() {
        let transfer = SystemInstruction::Transfer { lamports: 100 };
        assert_eq!(transfer.instruction_type(), SystemInstructionType::Transfer);
        assert_eq!(transfer.instruction_type().as_str(), "Transfer");
    }
}

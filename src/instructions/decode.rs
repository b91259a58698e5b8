//! Semantic decoding of decompiled instructions.

use super::compute_budget::ComputeBudgetInstruction;
use super::memo::decode_memo;
use super::system::SystemInstruction;
use super::types::*;
use crate::address_lookup_table::LookupTableInstruction;

/// Context for decoding an instruction - provides account addresses.
pub struct InstructionContext<'a> {
    pub program_id: &'a str,
    pub accounts: &'a [AccountMeta],
    pub data: &'a [u8],
}

impl InstructionContext<'_> {
    fn address(&self, index: usize) -> Option<String> {
        self.accounts.get(index).map(|a| a.pubkey.clone())
    }

    /// Addresses at `indexes`, or `None` if any is missing.
    fn addresses<const N: usize>(&self, indexes: [usize; N]) -> Option<[String; N]> {
        if indexes.iter().any(|i| *i >= self.accounts.len()) {
            return None;
        }
        Some(indexes.map(|i| self.accounts[i].pubkey.clone()))
    }
}

/// Decode a single instruction into a ParsedInstruction.
pub fn decode_instruction(ctx: InstructionContext) -> ParsedInstruction {
    let parsed = match ctx.program_id {
        SYSTEM_PROGRAM_ID => decode_system_instruction(&ctx),
        COMPUTE_BUDGET_PROGRAM_ID => decode_compute_budget_instruction(&ctx),
        MEMO_PROGRAM_ID => decode_memo(ctx.data)
            .ok()
            .map(|memo| ParsedInstruction::Memo(MemoParams { memo })),
        ADDRESS_LOOKUP_TABLE_PROGRAM_ID => decode_lookup_table_instruction(&ctx),
        _ => None,
    };
    parsed.unwrap_or_else(|| make_unknown(&ctx))
}

// =============================================================================
// System Program Decoding
// =============================================================================

fn decode_system_instruction(ctx: &InstructionContext) -> Option<ParsedInstruction> {
    let instr = SystemInstruction::decode(ctx.data).ok()?;

    let parsed = match instr {
        SystemInstruction::Transfer { lamports } => {
            let [from_address, to_address] = ctx.addresses([0, 1])?;
            ParsedInstruction::Transfer(TransferParams {
                from_address,
                to_address,
                amount: lamports,
            })
        }
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            let [from_address, new_address] = ctx.addresses([0, 1])?;
            ParsedInstruction::CreateAccount(CreateAccountParams {
                from_address,
                new_address,
                amount: lamports,
                space,
                owner: owner.to_string(),
            })
        }
        SystemInstruction::Assign { owner } => ParsedInstruction::Assign(AssignParams {
            account_address: ctx.address(0)?,
            owner: owner.to_string(),
        }),
        SystemInstruction::Allocate { space } => ParsedInstruction::Allocate(AllocateParams {
            account_address: ctx.address(0)?,
            space,
        }),
        SystemInstruction::AdvanceNonceAccount => {
            // Accounts: [0] nonce, [1] recent_blockhashes_sysvar, [2] authority
            let [wallet_nonce_address, auth_wallet_address] = ctx.addresses([0, 2])?;
            ParsedInstruction::NonceAdvance(NonceAdvanceParams {
                wallet_nonce_address,
                auth_wallet_address,
            })
        }
        SystemInstruction::InitializeNonceAccount { authorized } => {
            // Accounts: [0] nonce, [1] recent_blockhashes_sysvar, [2] rent_sysvar
            ParsedInstruction::NonceInitialize(NonceInitializeParams {
                nonce_address: ctx.address(0)?,
                auth_address: authorized.to_string(),
            })
        }
        SystemInstruction::WithdrawNonceAccount { lamports } => {
            // Accounts: [0] nonce, [1] to, [2] recent_blockhashes, [3] rent, [4] authority
            let [nonce_address, to_address, auth_address] = ctx.addresses([0, 1, 4])?;
            ParsedInstruction::NonceWithdraw(NonceWithdrawParams {
                nonce_address,
                to_address,
                auth_address,
                amount: lamports,
            })
        }
        SystemInstruction::AuthorizeNonceAccount { authorized } => {
            let [nonce_address, auth_address] = ctx.addresses([0, 1])?;
            ParsedInstruction::NonceAuthorize(NonceAuthorizeParams {
                nonce_address,
                auth_address,
                new_auth_address: authorized.to_string(),
            })
        }
        _ => return None,
    };
    Some(parsed)
}

// =============================================================================
// ComputeBudget Program Decoding
// =============================================================================

fn decode_compute_budget_instruction(ctx: &InstructionContext) -> Option<ParsedInstruction> {
    match ComputeBudgetInstruction::decode(ctx.data).ok()? {
        ComputeBudgetInstruction::SetComputeUnitLimit { units } => {
            Some(ParsedInstruction::SetComputeUnitLimit(SetComputeUnitLimitParams { units }))
        }
        ComputeBudgetInstruction::SetComputeUnitPrice { micro_lamports } => {
            Some(ParsedInstruction::SetPriorityFee(SetPriorityFeeParams {
                fee: micro_lamports,
            }))
        }
        _ => None,
    }
}

// =============================================================================
// Address Lookup Table Program Decoding
// =============================================================================

fn decode_lookup_table_instruction(ctx: &InstructionContext) -> Option<ParsedInstruction> {
    let parsed = match LookupTableInstruction::unpack(ctx.data).ok()? {
        LookupTableInstruction::CreateLookupTable {
            recent_slot,
            bump_seed,
        } => {
            let [table_address, authority_address, payer_address] = ctx.addresses([0, 1, 2])?;
            ParsedInstruction::CreateLookupTable(CreateLookupTableParams {
                table_address,
                authority_address,
                payer_address,
                recent_slot,
                bump_seed,
            })
        }
        LookupTableInstruction::ExtendLookupTable { new_addresses } => {
            let [table_address, authority_address] = ctx.addresses([0, 1])?;
            ParsedInstruction::ExtendLookupTable(ExtendLookupTableParams {
                table_address,
                authority_address,
                payer_address: ctx.address(2),
                addresses: new_addresses.iter().map(|a| a.to_string()).collect(),
            })
        }
        LookupTableInstruction::FreezeLookupTable => {
            let [table_address, authority_address] = ctx.addresses([0, 1])?;
            ParsedInstruction::FreezeLookupTable(LookupTableAuthorityParams {
                table_address,
                authority_address,
            })
        }
        LookupTableInstruction::DeactivateLookupTable => {
            let [table_address, authority_address] = ctx.addresses([0, 1])?;
            ParsedInstruction::DeactivateLookupTable(LookupTableAuthorityParams {
                table_address,
                authority_address,
            })
        }
        LookupTableInstruction::CloseLookupTable => {
            let [table_address, authority_address, recipient_address] =
                ctx.addresses([0, 1, 2])?;
            ParsedInstruction::CloseLookupTable(CloseLookupTableParams {
                table_address,
                authority_address,
                recipient_address,
            })
        }
    };
    Some(parsed)
}

// =============================================================================
// Fallback
// =============================================================================

fn make_unknown(ctx: &InstructionContext) -> ParsedInstruction {
    ParsedInstruction::Unknown(UnknownInstructionParams {
        program_id: ctx.program_id.to_string(),
        accounts: ctx.accounts.to_vec(),
        data: ctx.data.to_vec(),
    })
}

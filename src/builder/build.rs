//! Transaction building implementation.
//!
//! Intents compile to a legacy transaction, or to a v0 transaction when
//! lookup tables are supplied. Either way the result is unsigned.

use crate::address_lookup_table::{
    instruction as lookup_table_ix, AddressLookupTableAccount, AddressLookupTableState,
};
use crate::error::WasmSolanaError;
use crate::instruction::Instruction;
use crate::instructions::{compute_budget, memo, system};
use crate::message::{MessageV0, VersionedMessage};
use crate::transaction::{NonceInformation, SerializeConfig, Transaction};
use crate::versioned::VersionedTransaction;
use solana_hash::Hash;
use solana_pubkey::Pubkey;

use super::types::{Instruction as IntentInstruction, LookupTableContents, Nonce, TransactionIntent};

fn parse_pubkey(value: &str, field: &str) -> Result<Pubkey, WasmSolanaError> {
    value
        .parse()
        .map_err(|_| WasmSolanaError::new(&format!("Invalid {}: {}", field, value)))
}

fn parse_lamports(value: &str, field: &str) -> Result<u64, WasmSolanaError> {
    value
        .parse()
        .map_err(|_| WasmSolanaError::new(&format!("Invalid {}: {}", field, value)))
}

/// Build a transaction from an intent structure.
///
/// Returns the serialized unsigned transaction (wire format).
pub fn build_transaction(intent: TransactionIntent) -> Result<Vec<u8>, WasmSolanaError> {
    let fee_payer = parse_pubkey(&intent.fee_payer, "fee_payer")?;

    // For a durable nonce the advance instruction must come first.
    let (blockhash_str, nonce_instruction) = match &intent.nonce {
        Nonce::Blockhash { value } => (value, None),
        Nonce::Durable {
            address,
            authority,
            value,
        } => {
            let nonce_pubkey = parse_pubkey(address, "nonce.address")?;
            let authority_pubkey = parse_pubkey(authority, "nonce.authority")?;
            (
                value,
                Some(system::advance_nonce_account(&nonce_pubkey, &authority_pubkey)?),
            )
        }
    };
    let blockhash: Hash = blockhash_str
        .parse()
        .map_err(|_| WasmSolanaError::new(&format!("Invalid blockhash: {}", blockhash_str)))?;

    let mut instructions = Vec::with_capacity(intent.instructions.len());
    for ix in intent.instructions {
        instructions.extend(build_instruction(ix)?);
    }

    match &intent.address_lookup_tables {
        Some(tables) => {
            let tables = lookup_table_accounts(tables)?;
            if let Some(nonce_instruction) = nonce_instruction {
                instructions.insert(0, nonce_instruction);
            }
            let message = MessageV0::try_compile(&fee_payer, &instructions, &tables, blockhash)?;
            VersionedTransaction::new(VersionedMessage::V0(message), None)?.to_bytes()
        }
        None => {
            let mut tx = match nonce_instruction {
                Some(nonce_instruction) => Transaction::with_nonce(
                    fee_payer,
                    NonceInformation {
                        nonce: blockhash,
                        nonce_instruction,
                    },
                ),
                None => Transaction::new(fee_payer, blockhash),
            };
            tx.add_instructions(instructions);
            tx.serialize(SerializeConfig {
                require_all_signatures: false,
                verify_signatures: false,
            })
        }
    }
}

fn lookup_table_accounts(
    tables: &[LookupTableContents],
) -> Result<Vec<AddressLookupTableAccount>, WasmSolanaError> {
    tables
        .iter()
        .map(|table| {
            let key = parse_pubkey(&table.account_key, "addressLookupTables.accountKey")?;
            let addresses = table
                .addresses
                .iter()
                .map(|a| parse_pubkey(a, "addressLookupTables.addresses"))
                .collect::<Result<_, _>>()?;
            Ok(AddressLookupTableAccount::new(
                key,
                AddressLookupTableState {
                    addresses,
                    ..Default::default()
                },
            ))
        })
        .collect()
}

/// Build the instruction(s) for one intent entry.
fn build_instruction(ix: IntentInstruction) -> Result<Vec<Instruction>, WasmSolanaError> {
    let instruction = match ix {
        // ===== System Program =====
        IntentInstruction::Transfer { from, to, lamports } => system::transfer(
            &parse_pubkey(&from, "transfer.from")?,
            &parse_pubkey(&to, "transfer.to")?,
            parse_lamports(&lamports, "transfer.lamports")?,
        )?,

        IntentInstruction::CreateAccount {
            from,
            new_account,
            lamports,
            space,
            owner,
        } => system::create_account(
            &parse_pubkey(&from, "createAccount.from")?,
            &parse_pubkey(&new_account, "createAccount.newAccount")?,
            parse_lamports(&lamports, "createAccount.lamports")?,
            space,
            &parse_pubkey(&owner, "createAccount.owner")?,
        )?,

        IntentInstruction::NonceAdvance { nonce, authority } => system::advance_nonce_account(
            &parse_pubkey(&nonce, "nonceAdvance.nonce")?,
            &parse_pubkey(&authority, "nonceAdvance.authority")?,
        )?,

        IntentInstruction::NonceInitialize { nonce, authority } => {
            system::initialize_nonce_account(
                &parse_pubkey(&nonce, "nonceInitialize.nonce")?,
                &parse_pubkey(&authority, "nonceInitialize.authority")?,
            )?
        }

        IntentInstruction::NonceWithdraw {
            nonce,
            to,
            lamports,
            authority,
        } => system::withdraw_nonce_account(
            &parse_pubkey(&nonce, "nonceWithdraw.nonce")?,
            &parse_pubkey(&authority, "nonceWithdraw.authority")?,
            &parse_pubkey(&to, "nonceWithdraw.to")?,
            parse_lamports(&lamports, "nonceWithdraw.lamports")?,
        )?,

        IntentInstruction::Allocate { account, space } => {
            system::allocate(&parse_pubkey(&account, "allocate.account")?, space)?
        }

        IntentInstruction::Assign { account, owner } => system::assign(
            &parse_pubkey(&account, "assign.account")?,
            &parse_pubkey(&owner, "assign.owner")?,
        )?,

        // ===== Memo Program =====
        IntentInstruction::Memo { message } => memo::build_memo(&message, &[]),

        // ===== Compute Budget Program =====
        IntentInstruction::ComputeBudget {
            unit_limit,
            unit_price,
        } => {
            let mut built = Vec::with_capacity(2);
            if let Some(limit) = unit_limit {
                built.push(compute_budget::set_compute_unit_limit(limit)?);
            }
            if let Some(price) = unit_price {
                built.push(compute_budget::set_compute_unit_price(price)?);
            }
            if built.is_empty() {
                return Err(WasmSolanaError::new(
                    "ComputeBudget instruction requires either unitLimit or unitPrice",
                ));
            }
            return Ok(built);
        }

        // ===== Address Lookup Table Program =====
        IntentInstruction::CreateLookupTable {
            authority,
            payer,
            recent_slot,
        } => {
            let (instruction, table) = lookup_table_ix::create_lookup_table(
                parse_pubkey(&authority, "createLookupTable.authority")?,
                parse_pubkey(&payer, "createLookupTable.payer")?,
                recent_slot,
            )?;
            log::debug!("createLookupTable derives table address {}", table);
            instruction
        }

        IntentInstruction::ExtendLookupTable {
            table,
            authority,
            payer,
            addresses,
        } => {
            let payer = payer
                .as_deref()
                .map(|p| parse_pubkey(p, "extendLookupTable.payer"))
                .transpose()?;
            let addresses = addresses
                .iter()
                .map(|a| parse_pubkey(a, "extendLookupTable.addresses"))
                .collect::<Result<_, _>>()?;
            lookup_table_ix::extend_lookup_table(
                parse_pubkey(&table, "extendLookupTable.table")?,
                parse_pubkey(&authority, "extendLookupTable.authority")?,
                payer,
                addresses,
            )?
        }

        IntentInstruction::FreezeLookupTable { table, authority } => {
            lookup_table_ix::freeze_lookup_table(
                parse_pubkey(&table, "freezeLookupTable.table")?,
                parse_pubkey(&authority, "freezeLookupTable.authority")?,
            )?
        }

        IntentInstruction::DeactivateLookupTable { table, authority } => {
            lookup_table_ix::deactivate_lookup_table(
                parse_pubkey(&table, "deactivateLookupTable.table")?,
                parse_pubkey(&authority, "deactivateLookupTable.authority")?,
            )?
        }

        IntentInstruction::CloseLookupTable {
            table,
            authority,
            recipient,
        } => lookup_table_ix::close_lookup_table(
            parse_pubkey(&table, "closeLookupTable.table")?,
            parse_pubkey(&authority, "closeLookupTable.authority")?,
            parse_pubkey(&recipient, "closeLookupTable.recipient")?,
        )?,
    };
    Ok(vec![instruction])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::ParsedInstruction;
    use crate::parser::parse_transaction;
    use crate::versioned::TxVersion;

    const FEE_PAYER: &str = "DgT9qyYwYKBRDyDw3EfR12LHQCQjtNrKu2qMsXHuosmB";
    const RECIPIENT: &str = "FKjSjCqByQRwSzZoMXA7bKnDbJe41YgJTHFFzBeC42bH";
    const BLOCKHASH: &str = "GWaQEymC3Z9SHM2gkh8u12xL1zJPMHPCSVR3pSDpEXE4";

    fn transfer() -> IntentInstruction {
        IntentInstruction::Transfer {
            from: FEE_PAYER.to_string(),
            to: RECIPIENT.to_string(),
            lamports: "1000000".to_string(),
        }
    }

    fn intent(instructions: Vec<IntentInstruction>) -> TransactionIntent {
        TransactionIntent {
            fee_payer: FEE_PAYER.to_string(),
            nonce: Nonce::Blockhash {
                value: BLOCKHASH.to_string(),
            },
            instructions,
            address_lookup_tables: None,
        }
    }

    #[test]
    fn test_build_simple_transfer() {
        let tx_bytes = build_transaction(intent(vec![transfer()])).unwrap();

        let tx = Transaction::from_bytes(&tx_bytes).unwrap();
        assert_eq!(tx.instructions.len(), 1);
        assert_eq!(tx.fee_payer.unwrap().to_string(), FEE_PAYER);
        assert_eq!(tx.recent_blockhash.unwrap().to_string(), BLOCKHASH);
        assert_eq!(tx.signatures.len(), 1);
        assert!(tx.signatures[0].signature.is_none());
    }

    #[test]
    fn test_build_with_memo() {
        let tx_bytes = build_transaction(intent(vec![
            transfer(),
            IntentInstruction::Memo {
                message: "payroll batch 7".to_string(),
            },
        ]))
        .unwrap();

        let parsed = parse_transaction(&tx_bytes).unwrap();
        assert_eq!(parsed.instructions_data.len(), 2);
        assert!(matches!(
            parsed.instructions_data[1],
            ParsedInstruction::Memo(ref p) if p.memo == "payroll batch 7"
        ));
    }

    #[test]
    fn test_build_with_compute_budget() {
        let tx_bytes = build_transaction(intent(vec![
            IntentInstruction::ComputeBudget {
                unit_limit: Some(200000),
                unit_price: Some(1000),
            },
            transfer(),
        ]))
        .unwrap();

        let parsed = parse_transaction(&tx_bytes).unwrap();
        assert_eq!(parsed.instructions_data.len(), 3);
        assert!(matches!(
            parsed.instructions_data[0],
            ParsedInstruction::SetComputeUnitLimit(ref p) if p.units == 200000
        ));

        let empty = intent(vec![IntentInstruction::ComputeBudget {
            unit_limit: None,
            unit_price: None,
        }]);
        assert!(build_transaction(empty).is_err());
    }

    #[test]
    fn test_build_durable_nonce() {
        let nonce_address = "5hr5fisPi6DXNuuRpm5XUbzpiEnmdyxXuBDTwzwZj5Pe";
        let mut with_nonce = intent(vec![transfer()]);
        with_nonce.nonce = Nonce::Durable {
            address: nonce_address.to_string(),
            authority: FEE_PAYER.to_string(),
            value: BLOCKHASH.to_string(),
        };
        let tx_bytes = build_transaction(with_nonce).unwrap();

        let parsed = parse_transaction(&tx_bytes).unwrap();
        assert_eq!(parsed.nonce, BLOCKHASH);
        assert_eq!(parsed.instructions_data.len(), 2);
        let durable = parsed.durable_nonce.unwrap();
        assert_eq!(durable.wallet_nonce_address, nonce_address);
        assert_eq!(durable.auth_wallet_address, FEE_PAYER);
    }

    #[test]
    fn test_build_versioned_with_lookup_tables() {
        let table_key = "2immgwYNHBbyVQKVGCEkgWpi53bLwWNRMB5G2nbgYV17";
        let mut with_tables = intent(vec![transfer()]);
        with_tables.address_lookup_tables = Some(vec![LookupTableContents {
            account_key: table_key.to_string(),
            addresses: vec![RECIPIENT.to_string()],
        }]);
        let tx_bytes = build_transaction(with_tables).unwrap();

        let tx = VersionedTransaction::from_bytes(&tx_bytes).unwrap();
        assert_eq!(tx.version(), TxVersion::V0);
        assert_eq!(tx.static_account_keys().len(), 2);
        let lookups = tx.address_lookup_tables();
        assert_eq!(lookups.len(), 1);
        assert_eq!(lookups[0].account_key, table_key);
        assert_eq!(lookups[0].writable_indexes, vec![0]);
    }

    #[test]
    fn test_build_lookup_table_instructions() {
        let tx_bytes = build_transaction(intent(vec![
            IntentInstruction::CreateLookupTable {
                authority: FEE_PAYER.to_string(),
                payer: FEE_PAYER.to_string(),
                recent_slot: 1234,
            },
            IntentInstruction::ExtendLookupTable {
                table: RECIPIENT.to_string(),
                authority: FEE_PAYER.to_string(),
                payer: Some(FEE_PAYER.to_string()),
                addresses: vec![RECIPIENT.to_string()],
            },
        ]))
        .unwrap();

        let parsed = parse_transaction(&tx_bytes).unwrap();
        match &parsed.instructions_data[0] {
            ParsedInstruction::CreateLookupTable(p) => {
                assert_eq!(p.recent_slot, 1234);
                assert_eq!(p.authority_address, FEE_PAYER);
            }
            other => panic!("Expected CreateLookupTable, got {:?}", other),
        }
        assert!(matches!(
            parsed.instructions_data[1],
            ParsedInstruction::ExtendLookupTable(ref p) if p.addresses == vec![RECIPIENT.to_string()]
        ));
    }

    #[test]
    fn test_invalid_pubkey() {
        let mut bad = intent(vec![]);
        bad.fee_payer = "invalid".to_string();
        let err = build_transaction(bad).unwrap_err();
        assert_eq!(err.to_string(), "Invalid fee_payer: invalid");
    }

    #[test]
    fn test_intent_from_json() {
        let json = format!(
            r#"{{
                "feePayer": "{FEE_PAYER}",
                "nonce": {{ "type": "blockhash", "value": "{BLOCKHASH}" }},
                "instructions": [
                    {{ "type": "transfer", "from": "{FEE_PAYER}", "to": "{RECIPIENT}", "lamports": "5" }},
                    {{ "type": "computeBudget", "unitPrice": 10 }}
                ]
            }}"#
        );
        let intent: TransactionIntent = serde_json::from_str(&json).unwrap();
        assert!(intent.address_lookup_tables.is_none());
        let parsed = parse_transaction(&build_transaction(intent).unwrap()).unwrap();
        assert_eq!(parsed.instructions_data.len(), 2);
    }
}

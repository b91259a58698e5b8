//! Types for transaction building.
//!
//! These types are designed to be serialized from JavaScript via serde.
//! They use string representations for public keys and amounts to ensure
//! compatibility with JavaScript's number limitations.

use serde::Deserialize;

/// Nonce source for transaction - either a recent blockhash or durable nonce account.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Nonce {
    /// Use a recent blockhash (standard transactions)
    Blockhash { value: String },
    /// Use a durable nonce account (offline signing)
    Durable {
        address: String,
        authority: String,
        /// Nonce value stored in the account (this becomes the blockhash)
        value: String,
    },
}

/// Intent to build a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    /// The fee payer's public key (base58)
    pub fee_payer: String,
    /// Nonce source
    pub nonce: Nonce,
    /// List of instructions to include
    pub instructions: Vec<Instruction>,
    /// Lookup tables to compile against. When present the result is a v0
    /// transaction.
    #[serde(default)]
    pub address_lookup_tables: Option<Vec<LookupTableContents>>,
}

/// A lookup table account and the addresses it currently holds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupTableContents {
    pub account_key: String,
    pub addresses: Vec<String>,
}

/// An instruction to include in the transaction.
///
/// This is a discriminated union (tagged enum) that supports all instruction types.
/// Use the `type` field to determine which variant is being used.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Instruction {
    // ===== System Program Instructions =====
    /// Transfer SOL from one account to another
    Transfer {
        from: String,
        to: String,
        /// Amount in lamports (as string for BigInt compatibility)
        lamports: String,
    },

    /// Create a new account
    CreateAccount {
        from: String,
        #[serde(rename = "newAccount")]
        new_account: String,
        /// Lamports to transfer to new account (as string)
        lamports: String,
        /// Space to allocate in bytes
        space: u64,
        /// Program owner of the new account
        owner: String,
    },

    /// Advance a nonce account
    NonceAdvance {
        /// Nonce account address
        nonce: String,
        /// Nonce authority
        authority: String,
    },

    /// Initialize a nonce account
    NonceInitialize {
        /// Nonce account address
        nonce: String,
        /// Nonce authority
        authority: String,
    },

    /// Withdraw lamports from a nonce account
    NonceWithdraw {
        nonce: String,
        to: String,
        lamports: String,
        authority: String,
    },

    /// Allocate space in an account
    Allocate { account: String, space: u64 },

    /// Assign account to a program
    Assign { account: String, owner: String },

    // ===== Memo Program =====
    /// Add a memo to the transaction
    Memo { message: String },

    // ===== Compute Budget Program =====
    /// Set compute budget (priority fees)
    ComputeBudget {
        /// Compute unit limit (optional)
        #[serde(rename = "unitLimit")]
        unit_limit: Option<u32>,
        /// Compute unit price in micro-lamports (optional)
        #[serde(rename = "unitPrice")]
        unit_price: Option<u64>,
    },

    // ===== Address Lookup Table Program =====
    /// Create a lookup table owned by `authority` at the address derived from `recentSlot`
    CreateLookupTable {
        authority: String,
        payer: String,
        #[serde(rename = "recentSlot")]
        recent_slot: u64,
    },

    /// Append addresses to a lookup table
    ExtendLookupTable {
        table: String,
        authority: String,
        payer: Option<String>,
        addresses: Vec<String>,
    },

    FreezeLookupTable { table: String, authority: String },

    DeactivateLookupTable { table: String, authority: String },

    CloseLookupTable {
        table: String,
        authority: String,
        recipient: String,
    },
}

// =============================================================================
// Raw Versioned Transaction Data
// =============================================================================

/// Pre-compiled MessageV0 data that only needs serializing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVersionedTransactionData {
    /// Static account keys (base58 encoded public keys)
    pub static_account_keys: Vec<String>,

    /// Address lookup table references
    pub address_lookup_tables: Vec<AddressLookupTable>,

    /// Pre-compiled instructions with index-based account references
    pub versioned_instructions: Vec<VersionedInstruction>,

    pub message_header: RawMessageHeader,

    /// Recent blockhash (base58)
    pub recent_blockhash: String,
}

/// Address Lookup Table reference inside a compiled v0 message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressLookupTable {
    /// The lookup table account address (base58)
    pub account_key: String,
    /// Indices of writable accounts in the lookup table
    pub writable_indexes: Vec<u8>,
    /// Indices of readonly accounts in the lookup table
    pub readonly_indexes: Vec<u8>,
}

/// A pre-compiled versioned instruction (uses indexes, not pubkeys)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedInstruction {
    /// Index into the account keys array for the program ID
    pub program_id_index: u8,

    /// Indexes into the account keys array for instruction accounts
    pub account_key_indexes: Vec<u8>,

    /// Instruction data (base58 encoded)
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

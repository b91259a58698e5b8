use super::account_keys::{LookupSource, MessageAccountKeys};
use super::legacy::Message;
use super::v0::{MessageAddressTableLookup, MessageV0};
use super::{MessageHeader, VERSION_PREFIX_MASK};
use crate::error::{DecompileError, LayoutError, WasmSolanaError};
use crate::instruction::CompiledInstruction;
use solana_hash::Hash;
use solana_pubkey::Pubkey;

/// Transaction version enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxVersion {
    /// Legacy transaction format (pre-versioned)
    Legacy,
    /// Version 0 transaction with Address Lookup Tables
    V0,
}

impl std::fmt::Display for TxVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxVersion::Legacy => write!(f, "legacy"),
            TxVersion::V0 => write!(f, "0"),
        }
    }
}

/// Read the version marker at the start of serialized message bytes.
pub fn deserialize_message_version(bytes: &[u8]) -> Result<TxVersion, WasmSolanaError> {
    let prefix = *bytes
        .first()
        .ok_or_else(|| LayoutError::out_of_bounds(0, 1, 0))?;
    let masked = prefix & VERSION_PREFIX_MASK;
    if masked == prefix {
        return Ok(TxVersion::Legacy);
    }
    match masked {
        0 => Ok(TxVersion::V0),
        version => Err(WasmSolanaError::new(&format!(
            "Transaction message version {} deserialization is not supported",
            version
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedMessage {
    Legacy(Message),
    V0(MessageV0),
}

impl VersionedMessage {
    pub fn version(&self) -> TxVersion {
        match self {
            VersionedMessage::Legacy(_) => TxVersion::Legacy,
            VersionedMessage::V0(_) => TxVersion::V0,
        }
    }

    pub fn header(&self) -> &MessageHeader {
        match self {
            VersionedMessage::Legacy(m) => &m.header,
            VersionedMessage::V0(m) => &m.header,
        }
    }

    pub fn static_account_keys(&self) -> &[Pubkey] {
        match self {
            VersionedMessage::Legacy(m) => &m.account_keys,
            VersionedMessage::V0(m) => &m.static_account_keys,
        }
    }

    pub fn recent_blockhash(&self) -> &Hash {
        match self {
            VersionedMessage::Legacy(m) => &m.recent_blockhash,
            VersionedMessage::V0(m) => &m.recent_blockhash,
        }
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Hash) {
        match self {
            VersionedMessage::Legacy(m) => m.recent_blockhash = blockhash,
            VersionedMessage::V0(m) => m.recent_blockhash = blockhash,
        }
    }

    pub fn compiled_instructions(&self) -> &[CompiledInstruction] {
        match self {
            VersionedMessage::Legacy(m) => &m.instructions,
            VersionedMessage::V0(m) => &m.compiled_instructions,
        }
    }

    /// Lookup references; always empty for legacy messages.
    pub fn address_table_lookups(&self) -> &[MessageAddressTableLookup] {
        match self {
            VersionedMessage::Legacy(_) => &[],
            VersionedMessage::V0(m) => &m.address_table_lookups,
        }
    }

    /// Signer keys in signature-slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        let keys = self.static_account_keys();
        let count = (self.header().num_required_signatures as usize).min(keys.len());
        &keys[..count]
    }

    pub fn is_account_signer(&self, index: usize) -> bool {
        match self {
            VersionedMessage::Legacy(m) => m.is_account_signer(index),
            VersionedMessage::V0(m) => m.is_account_signer(index),
        }
    }

    pub fn is_account_writable(&self, index: usize) -> bool {
        match self {
            VersionedMessage::Legacy(m) => m.is_account_writable(index),
            VersionedMessage::V0(m) => m.is_account_writable(index),
        }
    }

    /// Full account table. Legacy messages ignore `source`.
    pub fn get_account_keys(&self, source: Option<LookupSource<'_>>) -> Result<MessageAccountKeys, DecompileError> {
        match self {
            VersionedMessage::Legacy(m) => Ok(m.get_account_keys()),
            VersionedMessage::V0(m) => m.get_account_keys(source),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, LayoutError> {
        match self {
            VersionedMessage::Legacy(m) => m.serialize(),
            VersionedMessage::V0(m) => m.serialize(),
        }
    }

    pub(crate) fn decode(bytes: &[u8], offset: usize) -> Result<(Self, usize), WasmSolanaError> {
        let rest = bytes.get(offset..).unwrap_or_default();
        match deserialize_message_version(rest)? {
            TxVersion::Legacy => {
                let (message, used) = Message::decode(bytes, offset)?;
                Ok((VersionedMessage::Legacy(message), used))
            }
            TxVersion::V0 => {
                let (message, used) = MessageV0::decode(bytes, offset)?;
                Ok((VersionedMessage::V0(message), used))
            }
        }
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, WasmSolanaError> {
        match deserialize_message_version(bytes)? {
            TxVersion::Legacy => Ok(VersionedMessage::Legacy(Message::deserialize(bytes)?)),
            TxVersion::V0 => Ok(VersionedMessage::V0(MessageV0::deserialize(bytes)?)),
        }
    }
}

impl From<Message> for VersionedMessage {
    fn from(message: Message) -> Self {
        VersionedMessage::Legacy(message)
    }
}

impl From<MessageV0> for VersionedMessage {
    fn from(message: MessageV0) -> Self {
        VersionedMessage::V0(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{AccountMeta, Instruction};

    fn instruction(payer: Pubkey) -> Instruction {
        Instruction::new(
            Pubkey::new_unique(),
            vec![AccountMeta::new(payer, true), AccountMeta::new(Pubkey::new_unique(), false)],
            vec![1],
        )
    }

    #[test]
    fn test_message_version_detection() {
        assert_eq!(deserialize_message_version(&[0x01]).unwrap(), TxVersion::Legacy);
        assert_eq!(deserialize_message_version(&[0x80]).unwrap(), TxVersion::V0);
        assert!(deserialize_message_version(&[0x81]).is_err());
        assert!(deserialize_message_version(&[]).is_err());
        assert_eq!(TxVersion::Legacy.to_string(), "legacy");
        assert_eq!(TxVersion::V0.to_string(), "0");
    }

    #[test]
    fn test_round_trip_both_versions() {
        let payer = Pubkey::new_unique();
        let ix = instruction(payer);
        let legacy: VersionedMessage = Message::compile(&payer, &[ix.clone()], Hash::default())
            .unwrap()
            .into();
        let v0: VersionedMessage = MessageV0::try_compile(&payer, &[ix], &[], Hash::default())
            .unwrap()
            .into();
        for message in [legacy, v0] {
            let bytes = message.serialize().unwrap();
            let decoded = VersionedMessage::deserialize(&bytes).unwrap();
            assert_eq!(decoded.version(), message.version());
            assert_eq!(decoded, message);
            assert_eq!(decoded.signer_keys(), &[payer]);
        }
    }

    #[test]
    fn test_legacy_and_v0_share_body() {
        let payer = Pubkey::new_unique();
        let ix = instruction(payer);
        let legacy = Message::compile(&payer, &[ix.clone()], Hash::default())
            .unwrap()
            .serialize()
            .unwrap();
        let v0 = MessageV0::try_compile(&payer, &[ix], &[], Hash::default())
            .unwrap()
            .serialize()
            .unwrap();
        assert_eq!(v0[0], 0x80);
        assert_eq!(&v0[1..v0.len() - 1], &legacy[..]);
        assert_eq!(v0[v0.len() - 1], 0, "empty lookup array");
    }
}

use solana_pubkey::Pubkey;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Dotted path to the field a layout error occurred in, e.g. `instructions[1].data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn push_front(&mut self, segment: String) {
        self.0.insert(0, segment);
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 && !segment.starts_with('[') {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Failures raised by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Not enough bytes to read from or write into.
    #[error("{path}: need {needed} bytes at offset {offset}, only {available} available")]
    OutOfBounds {
        path: FieldPath,
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// The value does not fit the schema (wrong kind, out of range, no variant).
    #[error("{path}: {message}")]
    Schema { path: FieldPath, message: String },
}

impl LayoutError {
    pub fn out_of_bounds(offset: usize, needed: usize, available: usize) -> Self {
        LayoutError::OutOfBounds {
            path: FieldPath::root(),
            offset,
            needed,
            available,
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        LayoutError::Schema {
            path: FieldPath::root(),
            message: message.into(),
        }
    }

    /// Prefix the error path with an enclosing field name or `[index]` segment.
    pub fn within(mut self, segment: impl Into<String>) -> Self {
        match &mut self {
            LayoutError::OutOfBounds { path, .. } | LayoutError::Schema { path, .. } => {
                path.push_front(segment.into())
            }
        }
        self
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            LayoutError::OutOfBounds { path, .. } | LayoutError::Schema { path, .. } => path,
        }
    }
}

/// Failures while turning instructions into a compiled message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Max static account keys length exceeded: {0} keys")]
    StaticKeysOverflow(usize),
    #[error("Account index overflow encountered during compilation: {0} keys")]
    AccountIndexOverflow(usize),
    #[error("Message header count overflow: {0} accounts")]
    HeaderCountOverflow(usize),
    #[error("Max lookup table index exceeded in table {table}: index {index}")]
    AddressTableLookupIndexOverflow { table: Pubkey, index: usize },
    #[error("Expected at least one writable signer key")]
    MissingFeePayer,
    #[error("Expected first writable signer key to be the fee payer {expected}, found {found}")]
    FeePayerMismatch { expected: Pubkey, found: Pubkey },
    #[error("Encountered an unknown instruction account key during compilation: {0}")]
    UnknownInstructionKey(Pubkey),
    #[error("Transaction recentBlockhash required")]
    MissingBlockhash,
    #[error("Transaction fee payer required")]
    MissingFeePayerKey,
    #[error("unknown signer: {0}")]
    UnknownSigner(Pubkey),
}

/// Failures while resolving a compiled message back into instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompileError {
    #[error("Message header is invalid")]
    InvalidHeader,
    #[error("Failed to decompile message because no account keys were found")]
    NoAccountKeys,
    #[error("Failed to find key for account key index {0}")]
    AccountIndexOutOfRange(u8),
    #[error("Failed to find program id for program id index {0}")]
    ProgramIdIndexOutOfRange(u8),
    #[error("Failed to get account keys because address table lookups were not resolved")]
    UnresolvedLookups,
    #[error("Failed to get account keys because of a mismatch in the number of account keys from lookups")]
    LookupCountMismatch,
    #[error("Failed to find address lookup table account for table key {0}")]
    MissingLookupTable(Pubkey),
    #[error("Failed to find address for index {index} in address lookup table {table}")]
    LookupIndexOutOfRange { table: Pubkey, index: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WasmSolanaError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Decompile(#[from] DecompileError),
    #[error("{reason}: {pubkey}")]
    Signer { pubkey: String, reason: String },
    #[error("{0}")]
    StringError(String),
}

impl From<&str> for WasmSolanaError {
    fn from(s: &str) -> Self {
        WasmSolanaError::StringError(s.to_string())
    }
}

impl From<String> for WasmSolanaError {
    fn from(s: String) -> Self {
        WasmSolanaError::StringError(s)
    }
}

impl WasmSolanaError {
    pub fn new(s: &str) -> WasmSolanaError {
        WasmSolanaError::StringError(s.to_string())
    }

    pub fn signer(pubkey: impl ToString, reason: &str) -> WasmSolanaError {
        WasmSolanaError::Signer {
            pubkey: pubkey.to_string(),
            reason: reason.to_string(),
        }
    }
}

// Required for wasm_bindgen to convert errors to JavaScript exceptions
// Uses js_sys::Error to create a proper JavaScript Error with stack trace
impl From<WasmSolanaError> for JsValue {
    fn from(err: WasmSolanaError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_display() {
        let err = LayoutError::schema("value out of range")
            .within("lamports")
            .within("[2]")
            .within("instructions");
        assert_eq!(err.to_string(), "instructions[2].lamports: value out of range");
    }

    #[test]
    fn test_root_path_display() {
        let err = LayoutError::out_of_bounds(4, 8, 2);
        assert!(err.path().is_root());
        assert_eq!(
            err.to_string(),
            "<root>: need 8 bytes at offset 4, only 2 available"
        );
    }

    #[test]
    fn test_from_str() {
        let err: WasmSolanaError = "test error".into();
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_layout_error_is_transparent() {
        let err: WasmSolanaError = LayoutError::schema("bad").within("data").into();
        assert_eq!(err.to_string(), "data: bad");
    }
}

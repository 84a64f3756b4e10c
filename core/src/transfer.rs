//! Outgoing transfer payloads: what gets signed and what gets broadcast.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// Longest memo accepted, in UTF-8 bytes.
pub const MAX_MEMO_LEN: usize = 128;

/// Default flat fee per transfer in nanos.
pub const DEFAULT_FEE_NANOS: u64 = 5_000_000;

/// Transaction kind byte for a plain value transfer.
pub const KIND_TRANSFER: u8 = 0x01;

/// The fields covered by the signature. Encoded with BCS, so field order
/// is part of the format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransfer {
    pub network_id: u8,
    pub kind: u8,
    pub recipient: String,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u64,
    /// Milliseconds since the Unix epoch. Orders transfers and guards against replay.
    pub timestamp_ms: i64,
    pub memo: Vec<u8>,
}

impl UnsignedTransfer {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bcs::to_bytes(self)
            .map_err(|e| WalletError::Signing(format!("Failed to encode transfer: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransfer {
    /// BCS encoding of the `UnsignedTransfer`.
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl SignedTransfer {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bcs::to_bytes(self)
            .map_err(|e| WalletError::Signing(format!("Failed to encode signed transfer: {e}")))
    }

    /// Hex form handed to the node's raw-transaction endpoint.
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.to_bytes()?))
    }

    pub fn transfer(&self) -> Result<UnsignedTransfer> {
        bcs::from_bytes(&self.payload)
            .map_err(|e| WalletError::Signing(format!("Corrupt transfer payload: {e}")))
    }
}

/// Check a memo against the size limit and return its bytes.
pub fn encode_memo(memo: &str) -> Result<Vec<u8>> {
    let bytes = memo.as_bytes();
    if bytes.len() > MAX_MEMO_LEN {
        return Err(WalletError::Validation(format!(
            "Memo is {} bytes; the limit is {MAX_MEMO_LEN}.",
            bytes.len()
        )));
    }
    Ok(bytes.to_vec())
}

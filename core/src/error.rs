//! Domain error type for wallet sync operations.

use thiserror::Error;

/// Typed error enum for collaborator calls. The sync components never let
/// these escape: they are flattened into `WebData::Failed(message)` at the
/// component boundary, so only the `Display` text survives.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Node unreachable, HTTP failure, or a response that could not be decoded.
    #[error("{0}")]
    Transport(String),

    /// Malformed address, amount or memo caught before anything is dispatched.
    #[error("{0}")]
    Validation(String),

    /// The node refused a broadcast (bad nonce, insufficient balance, bad payload).
    #[error("{0}")]
    Rejection(String),

    /// Key derivation or signing error.
    #[error("{0}")]
    Signing(String),

    /// Invalid wallet state or configuration.
    #[error("{0}")]
    InvalidState(String),

    /// Unexpected error from internal subsystems.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            WalletError::Transport(format!("Malformed response from node: {e}"))
        } else {
            WalletError::Transport(format!("Node request failed: {e}"))
        }
    }
}

/// Alias for `std::result::Result<T, WalletError>`.
pub type Result<T> = std::result::Result<T, WalletError>;

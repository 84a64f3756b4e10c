pub mod config;
pub mod display;
pub mod error;
pub mod network;
pub mod session;
pub mod signer;
pub mod sync;
pub mod transfer;
pub mod views;
pub mod wallet;
pub mod web_data;

#[cfg(test)]
mod test_support;

pub use config::SyncConfig;
pub use error::WalletError;
pub use network::{Account, ChainApi, NetworkClient, Transaction, TransactionType};
pub use session::{Screen, WalletSession};
pub use signer::{verify_transfer, Signer, SoftwareSigner};
pub use sync::{Decision, Notice, SubmissionPhase, TransferSummary, UserPrompt};
pub use transfer::{SignedTransfer, UnsignedTransfer};
pub use wallet::{Network, NetworkConfig, Wallet};
pub use web_data::WebData;

pub use iota_sdk::types::Address;

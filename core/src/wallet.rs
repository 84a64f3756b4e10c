/// Wallet state: the mnemonic, the derived addresses and the network config.
use iota_sdk::crypto::ed25519::Ed25519PrivateKey;
use iota_sdk::crypto::FromMnemonic;
use iota_sdk::types::Address;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{Result, WalletError};
use crate::signer::SoftwareSigner;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NetworkConfig {
    pub network: Network,
    pub custom_url: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            custom_url: None,
        }
    }
}

impl NetworkConfig {
    /// The node URL to talk to: the custom URL if set, otherwise the
    /// network's local default.
    pub fn node_url(&self) -> Option<&str> {
        match (&self.custom_url, self.network.default_url()) {
            (Some(url), _) => Some(url.as_str()),
            (None, default) => default,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
    Devnet,
    Custom,
}

impl Network {
    /// One-byte network id mixed into every signed transfer, so a transfer
    /// signed for one network cannot be replayed on another.
    pub fn id(self) -> u8 {
        match self {
            Network::Mainnet => 0,
            Network::Testnet => 1,
            Network::Devnet | Network::Custom => 2,
        }
    }

    /// API endpoint of a locally running full node for this network.
    pub fn default_url(self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some("http://127.0.0.1:5171"),
            Network::Testnet => Some("http://127.0.0.1:5172"),
            Network::Devnet => Some("http://127.0.0.1:5173"),
            Network::Custom => None,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
            Network::Devnet => write!(f, "devnet"),
            Network::Custom => write!(f, "custom"),
        }
    }
}

/// Generate a new 24-word BIP-39 mnemonic.
fn generate_mnemonic() -> Result<String> {
    let mnemonic = bip39::Mnemonic::generate(24)
        .map_err(|e| WalletError::Signing(format!("Failed to generate mnemonic: {e}")))?;
    Ok(mnemonic.to_string())
}

/// Derive an Ed25519 keypair and address from a mnemonic + account index.
fn derive_key(mnemonic: &str, account_index: u64) -> Result<(Ed25519PrivateKey, Address)> {
    let idx = if account_index == 0 { None } else { Some(account_index) };
    let private_key = Ed25519PrivateKey::from_mnemonic(mnemonic, idx, None)
        .map_err(|e| WalletError::Signing(format!("Failed to derive key from mnemonic: {e}")))?;
    let address = private_key.public_key().derive_address();
    Ok((private_key, address))
}

/// In-memory wallet. Addresses are derived once at construction and stay
/// in the same order for the whole session.
pub struct Wallet {
    mnemonic: Zeroizing<String>,
    addresses: Vec<String>,
    network_config: NetworkConfig,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("addresses", &self.addresses)
            .field("network", &self.network_config.network)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Create a wallet with a fresh mnemonic and a single account.
    pub fn create_new(network_config: NetworkConfig) -> Result<Self> {
        let mnemonic = Zeroizing::new(generate_mnemonic()?);
        Self::from_mnemonic(&mnemonic, 1, network_config)
    }

    /// Restore a wallet from a mnemonic, deriving `account_count` accounts
    /// (indices `0..account_count`).
    pub fn from_mnemonic(
        mnemonic: &str,
        account_count: u64,
        network_config: NetworkConfig,
    ) -> Result<Self> {
        let mnemonic = mnemonic.trim();
        bip39::Mnemonic::parse(mnemonic)
            .map_err(|e| WalletError::Validation(format!("Invalid mnemonic: {e}")))?;
        if account_count == 0 {
            return Err(WalletError::Validation(
                "A wallet needs at least one account.".into(),
            ));
        }

        let mut addresses = Vec::with_capacity(account_count as usize);
        for index in 0..account_count {
            let (_, address) = derive_key(mnemonic, index)?;
            addresses.push(address.to_string());
        }

        Ok(Self {
            mnemonic: Zeroizing::new(mnemonic.to_string()),
            addresses,
            network_config,
        })
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// All addresses owned by this wallet, in account-index order.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn network_config(&self) -> &NetworkConfig {
        &self.network_config
    }

    pub fn is_mainnet(&self) -> bool {
        self.network_config.network == Network::Mainnet
    }

    /// Derive the signing key for the account at `account_index`.
    pub fn signer(&self, account_index: usize) -> Result<SoftwareSigner> {
        if account_index >= self.addresses.len() {
            return Err(WalletError::InvalidState(format!(
                "Account #{account_index} does not exist (wallet has {}).",
                self.addresses.len()
            )));
        }
        let (private_key, _) = derive_key(&self.mnemonic, account_index as u64)?;
        Ok(SoftwareSigner::new(private_key))
    }
}

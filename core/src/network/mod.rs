/// Thin REST client for a wallet node, plus the contract the sync layer consumes.
mod history;
mod transfer;
mod types;

pub use types::{Account, BroadcastAck, Transaction, TransactionType};

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, WalletError};
use crate::transfer::SignedTransfer;
use crate::wallet::{Network, NetworkConfig};
use types::{AccountDto, ApiResponse};

const API_PREFIX: &str = "v2.1.0";

/// Remote operations the sync layer depends on. Implemented by
/// [`NetworkClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Balance and nonce for one address.
    async fn fetch_account(&self, address: &str) -> Result<Account>;

    /// Transactions `[from, to)` for an address, most recent first.
    /// Returns at most `to - from` entries.
    async fn fetch_transactions(
        &self,
        address: &str,
        from: u64,
        to: u64,
    ) -> Result<Vec<Transaction>>;

    /// Submit a signed transfer.
    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck>;
}

pub struct NetworkClient {
    pub(super) http: reqwest::Client,
    pub(super) network: Network,
    pub(super) node_url: String,
}

fn is_loopback(url: &str) -> bool {
    let rest = url.trim_start_matches("http://");
    if rest.starts_with("[::1]") {
        return true;
    }
    let host = rest.split(['/', ':']).next().unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}

/// Reject non-HTTPS node URLs unless `allow_insecure` is set or the node is local.
fn validate_node_url(url: &str, allow_insecure: bool) -> anyhow::Result<()> {
    if url.starts_with("https://") {
        return Ok(());
    }
    if url.starts_with("http://") {
        if allow_insecure || is_loopback(url) {
            return Ok(());
        }
        bail!("Refusing to connect over plain HTTP: {url}\nUse --insecure to allow unencrypted connections.");
    }
    bail!("Invalid node URL scheme: {url}\nExpected an https:// URL.");
}

impl NetworkClient {
    pub fn new(config: &NetworkConfig, allow_insecure: bool) -> anyhow::Result<Self> {
        let node_url = config
            .node_url()
            .ok_or_else(|| anyhow::anyhow!("Custom network requires a node URL"))?;
        validate_node_url(node_url, allow_insecure)?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("wallet-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            network: config.network,
            node_url: node_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    pub(super) fn endpoint(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.node_url)
    }

    /// Decode a node response envelope. A non-JSON body is a transport error
    /// regardless of HTTP status; `success: false` comes back as `Err(message)`.
    pub(super) async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<std::result::Result<T, String>> {
        let status = response.status();
        let body = response.bytes().await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&body).map_err(|e| {
            WalletError::Transport(format!("Malformed response from node ({status}): {e}"))
        })?;
        if !envelope.success {
            return Ok(Err(envelope
                .message
                .unwrap_or_else(|| format!("Node returned {status}"))));
        }
        envelope.result.map(Ok).ok_or_else(|| {
            WalletError::Transport(format!("Node response ({status}) carried no result"))
        })
    }

    /// Query the balance and nonce of an address.
    pub async fn account(&self, address: &str) -> Result<Account> {
        debug!(address, "fetching account");
        let response = self
            .http
            .get(self.endpoint("account"))
            .query(&[("address", address)])
            .send()
            .await?;
        let dto: AccountDto = Self::read_envelope(response)
            .await?
            .map_err(|msg| WalletError::Transport(format!("Account lookup failed: {msg}")))?;
        Ok(dto.into())
    }
}

#[async_trait]
impl ChainApi for NetworkClient {
    async fn fetch_account(&self, address: &str) -> Result<Account> {
        self.account(address).await
    }

    async fn fetch_transactions(
        &self,
        address: &str,
        from: u64,
        to: u64,
    ) -> Result<Vec<Transaction>> {
        self.transactions(address, from, to).await
    }

    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck> {
        self.send_raw(transfer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_network_without_url_fails() {
        let config = NetworkConfig {
            network: Network::Custom,
            custom_url: None,
        };

        let result = NetworkClient::new(&config, false);
        assert!(result.is_err(), "Custom network without URL should fail");
        let err = result.err().expect("already checked is_err").to_string();
        assert!(
            err.contains("Custom network requires a node URL"),
            "error should mention missing URL, got: {err}"
        );
    }

    #[test]
    fn rejects_remote_http_url_without_insecure() {
        let config = NetworkConfig {
            network: Network::Custom,
            custom_url: Some("http://node.example.com/api".to_string()),
        };
        let err = NetworkClient::new(&config, false).err().expect("should fail");
        assert!(err.to_string().contains("--insecure"));
    }

    #[test]
    fn accepts_http_url_with_insecure() {
        let config = NetworkConfig {
            network: Network::Custom,
            custom_url: Some("http://node.example.com/api".to_string()),
        };
        assert!(NetworkClient::new(&config, true).is_ok());
    }

    #[test]
    fn local_node_over_http_is_allowed() {
        let client = NetworkClient::new(&NetworkConfig::default(), false).unwrap();
        assert!(client.node_url().starts_with("http://127.0.0.1"));
        assert!(validate_node_url("http://localhost:5171", false).is_ok());
    }

    #[test]
    fn rejects_invalid_url_scheme() {
        let config = NetworkConfig {
            network: Network::Custom,
            custom_url: Some("ftp://example.com/api".to_string()),
        };
        let err = NetworkClient::new(&config, false).err().expect("should fail");
        assert!(err.to_string().contains("Invalid node URL scheme"));
    }

    #[test]
    fn endpoint_joins_prefix() {
        let config = NetworkConfig {
            network: Network::Custom,
            custom_url: Some("https://node.example.com/".to_string()),
        };
        let client = NetworkClient::new(&config, false).unwrap();
        assert_eq!(
            client.endpoint("account"),
            "https://node.example.com/v2.1.0/account"
        );
    }
}

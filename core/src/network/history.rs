use tracing::debug;

use super::types::{Transaction, TransactionDto};
use super::NetworkClient;
use crate::error::{Result, WalletError};

impl NetworkClient {
    /// Query the `[from, to)` window of an address's transaction list.
    ///
    /// Index 0 is the most recent transaction. The node may return fewer
    /// entries than requested; it should never return more, but the result
    /// is truncated to the window size in case it does.
    pub async fn transactions(
        &self,
        address: &str,
        from: u64,
        to: u64,
    ) -> Result<Vec<Transaction>> {
        if to < from {
            return Err(WalletError::Validation(format!(
                "Invalid transaction window [{from}, {to})"
            )));
        }
        if to == from {
            return Ok(Vec::new());
        }

        debug!(address, from, to, "fetching transactions");
        let response = self
            .http
            .get(self.endpoint("account/transactions"))
            .query(&[
                ("address", address.to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
            ])
            .send()
            .await?;

        let dtos: Vec<TransactionDto> = Self::read_envelope(response)
            .await?
            .map_err(|msg| WalletError::Transport(format!("Transaction query failed: {msg}")))?;

        let limit = usize::try_from(to - from).unwrap_or(usize::MAX);
        dtos.into_iter()
            .take(limit)
            .map(|dto| {
                Transaction::try_from(dto).map_err(|e| {
                    WalletError::Transport(format!("Malformed transaction from node: {e}"))
                })
            })
            .collect()
    }
}

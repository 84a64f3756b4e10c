use tracing::{debug, warn};

use super::types::BroadcastAck;
use super::NetworkClient;
use crate::error::{Result, WalletError};
use crate::transfer::SignedTransfer;

impl NetworkClient {
    /// Hand a signed transfer to the node for inclusion.
    ///
    /// A transport failure means the node may or may not have seen the
    /// transfer; a `success: false` answer is an explicit rejection.
    pub async fn send_raw(&self, transfer: &SignedTransfer) -> Result<BroadcastAck> {
        let raw = transfer.to_hex()?;
        debug!(bytes = raw.len() / 2, "broadcasting transfer");

        let response = self
            .http
            .post(self.endpoint("transaction/raw"))
            .query(&[("raw", raw.as_str())])
            .send()
            .await?;

        match Self::read_envelope::<String>(response).await? {
            Ok(hash) => Ok(BroadcastAck { hash }),
            Err(msg) => {
                warn!(error = %msg, "node rejected transfer");
                Err(WalletError::Rejection(msg))
            }
        }
    }
}

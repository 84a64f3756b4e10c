//! Send form: balances to pick the sending account from, plus submission.

use std::sync::Arc;

use tokio::sync::watch;

use crate::network::{Account, ChainApi};
use crate::sync::{fetch_accounts, Feed, FeedState, SubmissionPipeline, UserPrompt};
use crate::wallet::Wallet;

pub struct SendView {
    api: Arc<dyn ChainApi>,
    wallet: Arc<Wallet>,
    accounts: Feed<Vec<Account>>,
    pipeline: SubmissionPipeline,
}

impl SendView {
    pub fn new(api: Arc<dyn ChainApi>, wallet: Arc<Wallet>, fee: u64) -> Self {
        let network_id = wallet.network_config().network.id();
        Self {
            api,
            wallet,
            accounts: Feed::new(),
            pipeline: SubmissionPipeline::with_fee(network_id, fee),
        }
    }

    /// Load balances once. A success from an earlier visit stays on screen
    /// until the new one lands.
    pub fn activate(&mut self) {
        let ticket = self.accounts.dispatch();
        let sink = self.accounts.sink();
        let api = self.api.clone();
        let addresses = self.wallet.addresses().to_vec();
        tokio::spawn(async move {
            let result = fetch_accounts(api.as_ref(), &addresses).await;
            sink.deliver(ticket, result);
        });
    }

    /// Nothing is scheduled for this view, so there is nothing to cancel.
    pub fn deactivate(&mut self) {}

    pub fn subscribe(&self) -> watch::Receiver<FeedState<Vec<Account>>> {
        self.accounts.subscribe()
    }

    pub fn snapshot(&self) -> FeedState<Vec<Account>> {
        self.accounts.snapshot()
    }

    pub fn form(&self) -> &SubmissionPipeline {
        &self.pipeline
    }

    pub async fn submit(&self, prompt: &dyn UserPrompt) {
        self.pipeline
            .submit(&self.wallet, self.api.as_ref(), prompt)
            .await;
    }
}

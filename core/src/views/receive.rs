//! Balances of every wallet address, re-polled while on screen.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::network::{Account, ChainApi};
use crate::sync::{fetch_accounts, Feed, FeedState, Poller};

pub struct AccountsView {
    api: Arc<dyn ChainApi>,
    addresses: Arc<Vec<String>>,
    accounts: Feed<Vec<Account>>,
    poller: Poller,
}

impl AccountsView {
    pub fn new(api: Arc<dyn ChainApi>, addresses: Vec<String>, interval: Duration) -> Self {
        Self {
            api,
            addresses: Arc::new(addresses),
            accounts: Feed::new(),
            poller: Poller::new("accounts", interval),
        }
    }

    /// Fetch all balances now and every poll interval after.
    pub fn activate(&mut self) {
        let sink = self.accounts.sink();
        let api = self.api.clone();
        let addresses = self.addresses.clone();
        self.poller.start(move || {
            let ticket = sink.dispatch();
            let sink = sink.clone();
            let api = api.clone();
            let addresses = addresses.clone();
            async move {
                let Some(ticket) = ticket else {
                    return;
                };
                let result = fetch_accounts(api.as_ref(), &addresses).await;
                sink.deliver(ticket, result);
            }
        });
        debug!(addresses = self.addresses.len(), "accounts view active");
    }

    pub fn deactivate(&mut self) {
        self.poller.stop();
    }

    pub fn is_active(&self) -> bool {
        self.poller.is_active()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<Vec<Account>>> {
        self.accounts.subscribe()
    }

    pub fn snapshot(&self) -> FeedState<Vec<Account>> {
        self.accounts.snapshot()
    }
}

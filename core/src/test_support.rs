//! Scripted in-memory `ChainApi` for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Result, WalletError};
use crate::network::{Account, BroadcastAck, ChainApi, Transaction, TransactionType};
use crate::transfer::SignedTransfer;

#[derive(Default)]
pub(crate) struct FakeChain {
    accounts: Mutex<HashMap<String, std::result::Result<Account, String>>>,
    history: Mutex<HashMap<String, std::result::Result<Vec<Transaction>, String>>>,
    delays: HashMap<String, Duration>,
    broadcast_error: Mutex<Option<String>>,
    account_calls: AtomicUsize,
    history_calls: Mutex<Vec<(String, u64, u64)>>,
    broadcasts: Mutex<Vec<SignedTransfer>>,
}

pub(crate) fn sample_transaction(address: &str, i: u64) -> Transaction {
    Transaction {
        hash: format!("0xhash{i}"),
        kind: TransactionType::Transfer,
        from: address.to_string(),
        to: "0xdead".to_string(),
        value: (i + 1) * 1_000_000_000,
        fee: 5_000_000,
        nonce: i,
        timestamp: DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000 - i as i64 * 1000)
            .unwrap_or_default(),
        memo: String::new(),
    }
}

impl FakeChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_account(self, address: &str, available: u64, nonce: u64) -> Self {
        self.accounts.lock().unwrap().insert(
            address.to_string(),
            Ok(Account {
                address: address.to_string(),
                available,
                locked: 0,
                nonce,
            }),
        );
        self
    }

    pub(crate) fn with_account_error(self, address: &str, message: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(address.to_string(), Err(message.to_string()));
        self
    }

    /// `count` transactions for `address`, most recent first.
    pub(crate) fn with_history(self, address: &str, count: u64) -> Self {
        let txs = (0..count).map(|i| sample_transaction(address, i)).collect();
        self.history.lock().unwrap().insert(address.to_string(), Ok(txs));
        self
    }

    pub(crate) fn with_history_error(self, address: &str, message: &str) -> Self {
        self.set_history_error(address, message);
        self
    }

    pub(crate) fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    pub(crate) fn with_broadcast_error(self, message: &str) -> Self {
        *self.broadcast_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub(crate) fn set_account_balance(&self, address: &str, available: u64) {
        if let Some(Ok(account)) = self.accounts.lock().unwrap().get_mut(address) {
            account.available = available;
        }
    }

    pub(crate) fn set_history_error(&self, address: &str, message: &str) {
        self.history
            .lock()
            .unwrap()
            .insert(address.to_string(), Err(message.to_string()));
    }

    pub(crate) fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn history_calls(&self) -> Vec<(String, u64, u64)> {
        self.history_calls.lock().unwrap().clone()
    }

    pub(crate) fn broadcasts(&self) -> Vec<SignedTransfer> {
        self.broadcasts.lock().unwrap().clone()
    }

    async fn delay(&self, address: &str) {
        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl ChainApi for FakeChain {
    async fn fetch_account(&self, address: &str) -> Result<Account> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        self.delay(address).await;
        let entry = self.accounts.lock().unwrap().get(address).cloned();
        match entry {
            Some(Ok(account)) => Ok(account),
            Some(Err(msg)) => Err(WalletError::Transport(msg)),
            None => Err(WalletError::Transport(format!("unknown address {address}"))),
        }
    }

    async fn fetch_transactions(
        &self,
        address: &str,
        from: u64,
        to: u64,
    ) -> Result<Vec<Transaction>> {
        self.history_calls
            .lock()
            .unwrap()
            .push((address.to_string(), from, to));
        self.delay(address).await;
        let entry = self.history.lock().unwrap().get(address).cloned();
        match entry {
            Some(Ok(txs)) => Ok(txs
                .into_iter()
                .skip(from as usize)
                .take(to.saturating_sub(from) as usize)
                .collect()),
            Some(Err(msg)) => Err(WalletError::Transport(msg)),
            None => Ok(Vec::new()),
        }
    }

    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck> {
        if let Some(msg) = self.broadcast_error.lock().unwrap().clone() {
            return Err(WalletError::Rejection(msg));
        }
        self.broadcasts.lock().unwrap().push(transfer.clone());
        Ok(BroadcastAck {
            hash: format!("0xack{}", self.broadcasts.lock().unwrap().len()),
        })
    }
}

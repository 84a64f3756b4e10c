/// End-to-end session flows against an in-memory node, plus tests that hit a
/// real node. Run the latter with: cargo test -- --ignored
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use wallet_sync_core::error::{Result, WalletError};
use wallet_sync_core::network::BroadcastAck;
use wallet_sync_core::{
    verify_transfer, Account, ChainApi, Decision, Network, NetworkClient, NetworkConfig, Notice,
    Screen, SignedTransfer, SubmissionPhase, SyncConfig, Transaction, TransactionType,
    TransferSummary, UserPrompt, Wallet, WalletSession,
};

const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// A tiny ledger: balances, nonces and per-address history, newest first.
#[derive(Default)]
struct LocalNode {
    accounts: Mutex<HashMap<String, Account>>,
    history: Mutex<HashMap<String, Vec<Transaction>>>,
}

impl LocalNode {
    fn fund(&self, address: &str, amount: u64) {
        self.accounts.lock().unwrap().insert(
            address.to_string(),
            Account {
                address: address.to_string(),
                available: amount,
                locked: 0,
                nonce: 0,
            },
        );
    }
}

#[async_trait]
impl ChainApi for LocalNode {
    async fn fetch_account(&self, address: &str) -> Result<Account> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or(Account {
                address: address.to_string(),
                available: 0,
                locked: 0,
                nonce: 0,
            }))
    }

    async fn fetch_transactions(
        &self,
        address: &str,
        from: u64,
        to: u64,
    ) -> Result<Vec<Transaction>> {
        let history = self.history.lock().unwrap();
        Ok(history
            .get(address)
            .map(|txs| {
                txs.iter()
                    .skip(from as usize)
                    .take(to.saturating_sub(from) as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn broadcast(&self, signed: &SignedTransfer) -> Result<BroadcastAck> {
        if !verify_transfer(signed)? {
            return Err(WalletError::Rejection("bad signature".into()));
        }
        let transfer = signed.transfer()?;
        let public_key: [u8; 32] = signed
            .public_key
            .as_slice()
            .try_into()
            .map_err(|_| WalletError::Rejection("bad public key".into()))?;
        let sender = iota_sdk::types::Ed25519PublicKey::new(public_key)
            .derive_address()
            .to_string();

        let mut accounts = self.accounts.lock().unwrap();
        let from = accounts
            .get_mut(&sender)
            .ok_or_else(|| WalletError::Rejection("unknown sender".into()))?;
        if from.nonce != transfer.nonce {
            return Err(WalletError::Rejection(format!(
                "bad nonce {}, expected {}",
                transfer.nonce, from.nonce
            )));
        }
        let debit = transfer.amount + transfer.fee;
        if from.available < debit {
            return Err(WalletError::Rejection("insufficient balance".into()));
        }
        from.available -= debit;
        from.nonce += 1;
        let from_address = from.address.clone();

        let hash = format!("0x{}", hex::encode(&signed.signature[..8]));
        let tx = Transaction {
            hash: hash.clone(),
            kind: TransactionType::Transfer,
            from: from_address.clone(),
            to: transfer.recipient.clone(),
            value: transfer.amount,
            fee: transfer.fee,
            nonce: transfer.nonce,
            timestamp: DateTime::from_timestamp_millis(transfer.timestamp_ms).unwrap_or_default(),
            memo: String::from_utf8_lossy(&transfer.memo).into_owned(),
        };
        let mut history = self.history.lock().unwrap();
        history.entry(from_address).or_default().insert(0, tx.clone());
        history.entry(transfer.recipient.clone()).or_default().insert(0, tx);
        Ok(BroadcastAck { hash })
    }
}

struct AlwaysConfirm {
    notices: Mutex<Vec<Notice>>,
}

impl UserPrompt for AlwaysConfirm {
    fn confirm(&self, _summary: &TransferSummary) -> Decision {
        Decision::Confirm
    }

    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

#[tokio::test(start_paused = true)]
async fn send_then_history_shows_the_transfer() {
    let wallet = Wallet::from_mnemonic(TEST_MNEMONIC, 2, NetworkConfig::default()).unwrap();
    let sender = wallet.addresses()[0].clone();
    let recipient = wallet.addresses()[1].clone();
    let node = Arc::new(LocalNode::default());
    node.fund(&sender, 100_000_000_000);

    let mut session = WalletSession::new(wallet, node.clone(), &SyncConfig::default());

    session.navigate(Screen::Send);
    let form = session.send().form();
    form.set_recipient(&recipient).unwrap();
    form.set_amount("2.5").unwrap();
    form.set_memo("lunch").unwrap();
    let prompt = AlwaysConfirm {
        notices: Mutex::new(Vec::new()),
    };
    session.send().submit(&prompt).await;
    assert_eq!(session.send().form().phase(), SubmissionPhase::Succeeded);
    assert!(matches!(
        prompt.notices.lock().unwrap().as_slice(),
        [Notice::Submitted { .. }]
    ));

    session.navigate(Screen::Transactions);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let state = session.history().snapshot();
    let page = state.page(&sender).unwrap();
    assert_eq!((page.from, page.to), (0, 1));
    let txs = page.transactions.value().unwrap();
    assert_eq!(txs[0].to, recipient);
    assert_eq!(txs[0].value, 2_500_000_000);
    assert_eq!(txs[0].memo, "lunch");

    session.navigate(Screen::Accounts);
    tokio::time::sleep(Duration::from_millis(10)).await;
    let accounts = session.accounts().snapshot().data.value_or_else(Vec::new);
    assert_eq!(accounts[0].available, 100_000_000_000 - 2_500_000_000 - 5_000_000);
    assert_eq!(accounts[0].nonce, 1);
    session.close();
}

#[tokio::test(start_paused = true)]
async fn second_send_uses_the_next_nonce() {
    let wallet = Wallet::from_mnemonic(TEST_MNEMONIC, 2, NetworkConfig::default()).unwrap();
    let sender = wallet.addresses()[0].clone();
    let recipient = wallet.addresses()[1].clone();
    let node = Arc::new(LocalNode::default());
    node.fund(&sender, 10_000_000_000);
    let session = WalletSession::new(wallet, node.clone(), &SyncConfig::default());
    let prompt = AlwaysConfirm {
        notices: Mutex::new(Vec::new()),
    };

    for _ in 0..2 {
        let form = session.send().form();
        form.set_recipient(&recipient).unwrap();
        form.set_amount("1").unwrap();
        session.send().submit(&prompt).await;
        assert_eq!(form.phase(), SubmissionPhase::Succeeded);
    }
    let account = node.fetch_account(&sender).await.unwrap();
    assert_eq!(account.nonce, 2);
}

#[tokio::test(start_paused = true)]
async fn overdraft_is_rejected_and_form_kept() {
    let wallet = Wallet::from_mnemonic(TEST_MNEMONIC, 2, NetworkConfig::default()).unwrap();
    let recipient = wallet.addresses()[1].clone();
    let node = Arc::new(LocalNode::default());
    node.fund(&wallet.addresses()[0], 1_000_000_000);
    let session = WalletSession::new(wallet, node, &SyncConfig::default());
    let prompt = AlwaysConfirm {
        notices: Mutex::new(Vec::new()),
    };

    let form = session.send().form();
    form.set_recipient(&recipient).unwrap();
    form.set_amount("5").unwrap();
    session.send().submit(&prompt).await;

    let state = form.snapshot();
    assert_eq!(state.phase(), SubmissionPhase::Failed);
    assert_eq!(state.amount, "5");
    assert_eq!(state.recipient, recipient);
}

fn testnet_config() -> NetworkConfig {
    NetworkConfig {
        network: Network::Testnet,
        custom_url: None,
    }
}

#[tokio::test]
#[ignore]
async fn testnet_fresh_account_is_empty() {
    let network =
        NetworkClient::new(&testnet_config(), false).expect("failed to create testnet client");
    let wallet = Wallet::create_new(testnet_config()).expect("failed to create wallet");

    let account = network
        .fetch_account(&wallet.addresses()[0])
        .await
        .expect("failed to query account");
    assert_eq!(account.total(), 0, "fresh wallet should have 0 balance");
    assert_eq!(account.nonce, 0);
}

#[tokio::test]
#[ignore]
async fn testnet_fresh_history_is_empty() {
    let network =
        NetworkClient::new(&testnet_config(), false).expect("failed to create testnet client");
    let wallet = Wallet::create_new(testnet_config()).expect("failed to create wallet");

    let txs = network
        .fetch_transactions(&wallet.addresses()[0], 0, 100)
        .await
        .expect("failed to query transactions");
    assert!(txs.is_empty());
}

#[tokio::test]
#[ignore]
async fn testnet_unfunded_send_is_rejected() {
    let config = testnet_config();
    let network =
        Arc::new(NetworkClient::new(&config, false).expect("failed to create testnet client"));
    let wallet = Wallet::create_new(config).expect("failed to create wallet");
    let session = WalletSession::new(wallet, network, &SyncConfig::default());
    let prompt = AlwaysConfirm {
        notices: Mutex::new(Vec::new()),
    };

    let recipient = session.wallet().addresses()[0].clone();
    session.send().form().set_recipient(&recipient).unwrap();
    session.send().form().set_amount("1").unwrap();
    session.send().submit(&prompt).await;

    assert_eq!(session.send().form().phase(), SubmissionPhase::Failed);
    assert!(matches!(
        prompt.notices.lock().unwrap().as_slice(),
        [Notice::Failed(_)]
    ));
}

//! Confirm, sign, broadcast, report.
//!
//! A submission moves through `Idle -> Confirming -> Pending -> Succeeded |
//! Failed`. Confirmation is a synchronous request to the [`UserPrompt`]; a
//! cancel goes back to where it started without touching anything. Failed
//! submissions keep the form so the user can fix it and try again. Nothing is
//! retried automatically.

use std::fmt;
use std::sync::{Arc, Weak};

use chrono::Utc;
use iota_sdk::types::Address;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::display::{format_amount, parse_amount};
use crate::error::{Result, WalletError};
use crate::network::{BroadcastAck, ChainApi};
use crate::signer::{Signer, SoftwareSigner};
use crate::transfer::{encode_memo, UnsignedTransfer, DEFAULT_FEE_NANOS, KIND_TRANSFER};
use crate::wallet::Wallet;
use crate::web_data::WebData;

/// The send form plus the outcome of the latest submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionState {
    pub selected_account: usize,
    pub recipient: String,
    /// Decimal string in whole units, as typed.
    pub amount: String,
    pub memo: String,
    pub result: WebData<()>,
    confirming: bool,
}

impl SubmissionState {
    pub fn phase(&self) -> SubmissionPhase {
        if self.confirming {
            return SubmissionPhase::Confirming;
        }
        match self.result {
            WebData::NotRequested => SubmissionPhase::Idle,
            WebData::Pending => SubmissionPhase::Pending,
            WebData::Succeeded(()) => SubmissionPhase::Succeeded,
            WebData::Failed(_) => SubmissionPhase::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Confirming,
    Pending,
    Succeeded,
    Failed,
}

/// What the user is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub from: String,
    pub recipient: String,
    pub amount: u64,
    pub fee: u64,
    pub memo: String,
}

impl fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Are you sure you want to transfer {} to {}?",
            format_amount(self.amount),
            self.recipient
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

/// Message shown to the user once a submission settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Submitted { hash: String },
    Failed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Submitted { hash } => write!(
                f,
                "Transfer {hash} is pending network verification. See the transactions view for its status."
            ),
            Notice::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

/// Request/response boundary to whoever is driving the form. Both calls
/// block the submission until they return.
pub trait UserPrompt: Send + Sync {
    fn confirm(&self, summary: &TransferSummary) -> Decision;
    fn notify(&self, notice: &Notice);
}

/// A validated form, ready to be shown for confirmation.
struct Draft {
    account_index: usize,
    from: String,
    recipient: Address,
    amount: u64,
    memo: Vec<u8>,
    memo_text: String,
}

/// Confirmed submission. Carries everything the network part needs, so the
/// form can keep being observed while it runs.
pub struct SubmissionJob {
    signer: SoftwareSigner,
    recipient: Address,
    amount: u64,
    fee: u64,
    memo: Vec<u8>,
    network_id: u8,
    state: Weak<watch::Sender<SubmissionState>>,
}

impl SubmissionJob {
    /// Look up the sender's nonce, sign, broadcast.
    pub async fn run(&self, api: &dyn ChainApi) -> Result<BroadcastAck> {
        let sender = self.signer.address().to_string();
        let account = api.fetch_account(&sender).await?;
        debug!(address = %sender, nonce = account.nonce, "nonce resolved");

        let transfer = UnsignedTransfer {
            network_id: self.network_id,
            kind: KIND_TRANSFER,
            recipient: self.recipient.to_string(),
            amount: self.amount,
            fee: self.fee,
            nonce: account.nonce,
            timestamp_ms: Utc::now().timestamp_millis(),
            memo: self.memo.clone(),
        };
        let signed = self.signer.sign_transfer(&transfer)?;
        api.broadcast(&signed).await
    }

    /// Fold the outcome into the form. On success the recipient, amount and
    /// memo are cleared; on failure they are kept. Either way the user is
    /// told.
    pub fn finish(self, outcome: Result<BroadcastAck>, prompt: &dyn UserPrompt) {
        let notice = match &outcome {
            Ok(ack) => {
                info!(hash = %ack.hash, "transfer broadcast");
                Notice::Submitted {
                    hash: ack.hash.clone(),
                }
            }
            Err(e) => {
                warn!(error = %e, "transfer failed");
                Notice::Failed(e.to_string())
            }
        };

        if let Some(state) = self.state.upgrade() {
            state.send_modify(|form| match outcome {
                Ok(_) => {
                    form.recipient.clear();
                    form.amount.clear();
                    form.memo.clear();
                    form.result = WebData::Succeeded(());
                }
                Err(e) => form.result = WebData::Failed(e.to_string()),
            });
        } else {
            debug!("send view dropped, discarding submission result");
        }
        prompt.notify(&notice);
    }
}

pub struct SubmissionPipeline {
    state: Arc<watch::Sender<SubmissionState>>,
    fee: u64,
    network_id: u8,
}

impl SubmissionPipeline {
    pub fn new(network_id: u8) -> Self {
        Self::with_fee(network_id, DEFAULT_FEE_NANOS)
    }

    pub fn with_fee(network_id: u8, fee: u64) -> Self {
        let (tx, _rx) = watch::channel(SubmissionState::default());
        Self {
            state: Arc::new(tx),
            fee,
            network_id,
        }
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state.borrow().phase()
    }

    pub fn select_account(&self, index: usize) -> Result<()> {
        self.edit(|form| form.selected_account = index)
    }

    pub fn set_recipient(&self, recipient: &str) -> Result<()> {
        let recipient = recipient.trim().to_string();
        self.edit(|form| form.recipient = recipient)
    }

    pub fn set_amount(&self, amount: &str) -> Result<()> {
        let amount = amount.trim().to_string();
        self.edit(|form| form.amount = amount)
    }

    pub fn set_memo(&self, memo: &str) -> Result<()> {
        let memo = memo.to_string();
        self.edit(|form| form.memo = memo)
    }

    /// Any edit after a settled submission returns the form to idle.
    fn edit(&self, apply: impl FnOnce(&mut SubmissionState)) -> Result<()> {
        let mut rejected = false;
        self.state.send_if_modified(|form| {
            if form.result.is_pending() {
                rejected = true;
                return false;
            }
            apply(form);
            form.result = WebData::NotRequested;
            true
        });
        if rejected {
            return Err(WalletError::InvalidState(
                "A transfer is being submitted. Wait for it to finish.".into(),
            ));
        }
        Ok(())
    }

    fn draft(&self, form: &SubmissionState, wallet: &Wallet) -> Result<Draft> {
        let from = wallet
            .addresses()
            .get(form.selected_account)
            .cloned()
            .ok_or_else(|| {
                WalletError::Validation(format!(
                    "Account #{} does not exist.",
                    form.selected_account
                ))
            })?;
        if form.recipient.is_empty() {
            return Err(WalletError::Validation("Recipient is required.".into()));
        }
        let recipient = Address::from_hex(&form.recipient).map_err(|e| {
            WalletError::Validation(format!("Invalid recipient '{}': {e}", form.recipient))
        })?;
        let amount = parse_amount(&form.amount).map_err(WalletError::Validation)?;
        if amount == 0 {
            return Err(WalletError::Validation(
                "Amount must be greater than zero.".into(),
            ));
        }
        let memo = encode_memo(&form.memo)?;
        Ok(Draft {
            account_index: form.selected_account,
            from,
            recipient,
            amount,
            memo,
            memo_text: form.memo.clone(),
        })
    }

    fn fail(&self, error: WalletError, prompt: &dyn UserPrompt) {
        let msg = error.to_string();
        warn!(error = %msg, "submission rejected before dispatch");
        self.state
            .send_modify(|form| form.result = WebData::Failed(msg.clone()));
        prompt.notify(&Notice::Failed(msg));
    }

    fn set_confirming(&self, confirming: bool) {
        self.state.send_if_modified(|form| {
            std::mem::replace(&mut form.confirming, confirming) != confirming
        });
    }

    /// Validate the form and ask for confirmation. Returns the job to run on
    /// approval, `None` if the user cancelled or the form was invalid (the
    /// latter is reported through `prompt` and recorded as a failure).
    pub fn begin(&self, wallet: &Wallet, prompt: &dyn UserPrompt) -> Option<SubmissionJob> {
        let form = self.snapshot();
        if form.result.is_pending() {
            debug!("submission already in flight");
            return None;
        }

        let draft = match self.draft(&form, wallet) {
            Ok(draft) => draft,
            Err(e) => {
                self.fail(e, prompt);
                return None;
            }
        };

        let summary = TransferSummary {
            from: draft.from.clone(),
            recipient: draft.recipient.to_string(),
            amount: draft.amount,
            fee: self.fee,
            memo: draft.memo_text.clone(),
        };

        self.set_confirming(true);
        let decision = prompt.confirm(&summary);
        self.set_confirming(false);

        if decision == Decision::Cancel {
            debug!("transfer cancelled by user");
            return None;
        }

        let signer = match wallet.signer(draft.account_index) {
            Ok(signer) => signer,
            Err(e) => {
                self.fail(e, prompt);
                return None;
            }
        };

        self.state
            .send_modify(|form| form.result = WebData::Pending);
        info!(
            from = %draft.from,
            to = %summary.recipient,
            amount = draft.amount,
            fee = self.fee,
            "transfer confirmed"
        );

        Some(SubmissionJob {
            signer,
            recipient: draft.recipient,
            amount: draft.amount,
            fee: self.fee,
            memo: draft.memo,
            network_id: self.network_id,
            state: Arc::downgrade(&self.state),
        })
    }

    /// Run one full submission cycle in place.
    pub async fn submit(&self, wallet: &Wallet, api: &dyn ChainApi, prompt: &dyn UserPrompt) {
        let Some(job) = self.begin(wallet, prompt) else {
            return;
        };
        let outcome = job.run(api).await;
        job.finish(outcome, prompt);
    }
}

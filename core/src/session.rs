/// One unlocked wallet talking to one node, with a view per screen.
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::SyncConfig;
use crate::network::ChainApi;
use crate::views::{AccountsView, HistoryView, SendView};
use crate::wallet::Wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Accounts,
    Send,
    Transactions,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Accounts => write!(f, "accounts"),
            Screen::Send => write!(f, "send"),
            Screen::Transactions => write!(f, "transactions"),
        }
    }
}

/// Owns every view's state for the lifetime of the session. At most one
/// view is active; leaving a screen stops its polling.
pub struct WalletSession {
    wallet: Arc<Wallet>,
    screen: Option<Screen>,
    accounts: AccountsView,
    send: SendView,
    history: HistoryView,
}

impl WalletSession {
    pub fn new(wallet: Wallet, api: Arc<dyn ChainApi>, config: &SyncConfig) -> Self {
        let wallet = Arc::new(wallet);
        let addresses = wallet.addresses().to_vec();
        Self {
            accounts: AccountsView::new(api.clone(), addresses.clone(), config.poll_interval()),
            send: SendView::new(api.clone(), wallet.clone(), config.fee_nanos),
            history: HistoryView::new(api, addresses, config.page_size, config.poll_interval()),
            wallet,
            screen: None,
        }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    /// Leave the current screen and enter `screen`. Navigating to the screen
    /// already shown does nothing.
    pub fn navigate(&mut self, screen: Screen) {
        if self.screen == Some(screen) {
            return;
        }
        self.leave();
        match screen {
            Screen::Accounts => self.accounts.activate(),
            Screen::Send => self.send.activate(),
            Screen::Transactions => self.history.activate(),
        }
        info!(screen = %screen, "navigated");
        self.screen = Some(screen);
    }

    fn leave(&mut self) {
        match self.screen.take() {
            Some(Screen::Accounts) => self.accounts.deactivate(),
            Some(Screen::Send) => self.send.deactivate(),
            Some(Screen::Transactions) => self.history.deactivate(),
            None => {}
        }
    }

    /// Stop all polling. View state stays readable until the session drops.
    pub fn close(&mut self) {
        self.leave();
    }

    pub fn accounts(&self) -> &AccountsView {
        &self.accounts
    }

    pub fn send(&self) -> &SendView {
        &self.send
    }

    pub fn history(&self) -> &HistoryView {
        &self.history
    }
}

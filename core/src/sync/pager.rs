//! Per-address paging cursors over the transaction feed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::Result;
use crate::network::{ChainApi, Transaction};
use crate::web_data::WebData;

pub const PAGE_SIZE: u64 = 100;

/// Cursor and cached result for one address.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub address: String,
    pub from: u64,
    /// Exclusive end of the window.
    pub to: u64,
    pub transactions: WebData<Vec<Transaction>>,
    generation: u64,
    applied: u64,
}

impl Page {
    /// A never-fetched page: `from = 0`, `to = page_size`.
    pub fn blank(address: &str, page_size: u64) -> Self {
        Self {
            address: address.to_string(),
            from: 0,
            to: page_size,
            transactions: WebData::NotRequested,
            generation: 0,
            applied: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagerState {
    selected_address: Option<String>,
    pages: HashMap<String, Page>,
}

impl PagerState {
    pub fn selected_address(&self) -> Option<&str> {
        self.selected_address.as_deref()
    }

    pub fn page(&self, address: &str) -> Option<&Page> {
        self.pages.get(address)
    }

    pub fn selected_page(&self) -> Option<&Page> {
        self.selected_address
            .as_deref()
            .and_then(|address| self.pages.get(address))
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A dispatched range fetch. It may write its result unless a later request
/// for the same address has already written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub address: String,
    pub from: u64,
    pub to: u64,
    generation: u64,
}

/// Owns the paging state of the history view.
pub struct TransactionPager {
    state: Arc<watch::Sender<PagerState>>,
    visible: Arc<AtomicBool>,
    page_size: u64,
}

impl TransactionPager {
    pub fn new(page_size: u64) -> Self {
        let (tx, _rx) = watch::channel(PagerState::default());
        Self {
            state: Arc::new(tx),
            visible: Arc::new(AtomicBool::new(false)),
            page_size,
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Fetches are refused while the owning view is off screen.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<PagerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PagerState {
        self.state.borrow().clone()
    }

    pub fn handle(&self) -> PagerHandle {
        PagerHandle {
            state: Arc::downgrade(&self.state),
            visible: self.visible.clone(),
        }
    }

    /// Resolve the address to page (explicit override, else the current
    /// selection, else the wallet's first address), make it the selection,
    /// create its page on first use, and mark the page as loading.
    ///
    /// Returns `None` without touching state when the view is hidden or the
    /// wallet has no address.
    pub fn begin(&self, wallet_addresses: &[String], address: Option<&str>) -> Option<PageRequest> {
        self.handle().begin(wallet_addresses, address, self.page_size)
    }

    pub fn apply(&self, request: &PageRequest, result: Result<Vec<Transaction>>) -> bool {
        self.handle().apply(request, result)
    }

    /// Dispatch and await one range fetch. Returns `false` if nothing was
    /// dispatched.
    pub async fn fetch(
        &self,
        api: &dyn ChainApi,
        wallet_addresses: &[String],
        address: Option<&str>,
    ) -> bool {
        let Some(request) = self.begin(wallet_addresses, address) else {
            return false;
        };
        let result = api
            .fetch_transactions(&request.address, request.from, request.to)
            .await;
        self.apply(&request, result);
        true
    }

    /// Grow the selected page's window by one page size. The caller fetches
    /// afterwards to fill it.
    pub fn extend_selected(&self) -> bool {
        let page_size = self.page_size;
        self.state.send_if_modified(|state| {
            let Some(address) = state.selected_address.clone() else {
                return false;
            };
            let Some(page) = state.pages.get_mut(&address) else {
                return false;
            };
            page.to = page.to.saturating_add(page_size);
            debug!(address = %address, from = page.from, to = page.to, "page extended");
            true
        })
    }

    /// Move an address's cursor back to `from` with a fresh one-page window.
    /// Any fetch still in flight for that address is ignored when it lands.
    pub fn reset(&self, address: &str, from: u64) {
        let page_size = self.page_size;
        self.state.send_modify(|state| {
            let page = state
                .pages
                .entry(address.to_string())
                .or_insert_with(|| Page::blank(address, page_size));
            page.generation += 1;
            page.applied = page.generation;
            page.from = from;
            page.to = from.saturating_add(page_size);
            page.transactions = WebData::NotRequested;
        });
    }
}

/// Shared handle used by poll tasks. Holds the state weakly so results
/// landing after the view is gone are dropped.
#[derive(Clone)]
pub struct PagerHandle {
    state: Weak<watch::Sender<PagerState>>,
    visible: Arc<AtomicBool>,
}

impl PagerHandle {
    pub fn begin(
        &self,
        wallet_addresses: &[String],
        address: Option<&str>,
        page_size: u64,
    ) -> Option<PageRequest> {
        if !self.visible.load(Ordering::SeqCst) {
            debug!("history view hidden, not fetching");
            return None;
        }
        let state = self.state.upgrade()?;

        let mut request = None;
        state.send_if_modified(|current| {
            let resolved = address
                .map(str::to_string)
                .or_else(|| current.selected_address.clone())
                .or_else(|| wallet_addresses.first().cloned());
            let Some(resolved) = resolved else {
                return false;
            };

            let page = current
                .pages
                .entry(resolved.clone())
                .or_insert_with(|| Page::blank(&resolved, page_size));
            page.generation += 1;
            let previous = std::mem::replace(&mut page.transactions, WebData::NotRequested);
            page.transactions = previous.into_pending();

            request = Some(PageRequest {
                address: resolved.clone(),
                from: page.from,
                to: page.to,
                generation: page.generation,
            });
            current.selected_address = Some(resolved);
            true
        });

        if let Some(req) = &request {
            debug!(
                address = %req.address,
                from = req.from,
                to = req.to,
                generation = req.generation,
                "page fetch dispatched"
            );
        }
        request
    }

    /// Fold a fetch result into its page. On success the window end becomes
    /// `from + returned`; on failure the cursor is left alone.
    pub fn apply(&self, request: &PageRequest, result: Result<Vec<Transaction>>) -> bool {
        let Some(state) = self.state.upgrade() else {
            debug!(address = %request.address, "history view dropped, discarding page");
            return false;
        };

        state.send_if_modified(|current| {
            let Some(page) = current.pages.get_mut(&request.address) else {
                return false;
            };
            if request.generation <= page.applied {
                debug!(
                    address = %request.address,
                    generation = request.generation,
                    applied = page.applied,
                    "discarding stale page"
                );
                return false;
            }
            page.applied = request.generation;
            match result {
                Ok(txs) => {
                    page.to = request.from + txs.len() as u64;
                    debug!(
                        address = %request.address,
                        count = txs.len(),
                        to = page.to,
                        "page loaded"
                    );
                    page.transactions = WebData::Succeeded(txs);
                }
                Err(e) => {
                    warn!(address = %request.address, error = %e, "page fetch failed");
                    page.transactions = WebData::Failed(e.to_string());
                }
            }
            true
        })
    }
}

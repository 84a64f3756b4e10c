//! Transaction history of one selected address at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::network::ChainApi;
use crate::sync::{PageRequest, PagerState, Poller, TransactionPager};

pub struct HistoryView {
    api: Arc<dyn ChainApi>,
    addresses: Arc<Vec<String>>,
    pager: TransactionPager,
    poller: Poller,
}

impl HistoryView {
    pub fn new(
        api: Arc<dyn ChainApi>,
        addresses: Vec<String>,
        page_size: u64,
        interval: Duration,
    ) -> Self {
        Self {
            api,
            addresses: Arc::new(addresses),
            pager: TransactionPager::new(page_size),
            poller: Poller::new("history", interval),
        }
    }

    /// Make the pager visible and re-fetch the selected page every interval.
    pub fn activate(&mut self) {
        self.pager.set_visible(true);
        let handle = self.pager.handle();
        let api = self.api.clone();
        let addresses = self.addresses.clone();
        let page_size = self.pager.page_size();
        self.poller.start(move || {
            let request = handle.begin(&addresses, None, page_size);
            let handle = handle.clone();
            let api = api.clone();
            async move {
                let Some(request) = request else {
                    return;
                };
                let result = api
                    .fetch_transactions(&request.address, request.from, request.to)
                    .await;
                handle.apply(&request, result);
            }
        });
    }

    pub fn deactivate(&mut self) {
        self.poller.stop();
        self.pager.set_visible(false);
    }

    pub fn is_active(&self) -> bool {
        self.poller.is_active()
    }

    pub fn subscribe(&self) -> watch::Receiver<PagerState> {
        self.pager.subscribe()
    }

    pub fn snapshot(&self) -> PagerState {
        self.pager.snapshot()
    }

    /// Switch to `address` and fetch its page. The page of the address being
    /// left keeps its cursor.
    pub async fn select_address(&self, address: &str) {
        self.pager
            .fetch(self.api.as_ref(), &self.addresses, Some(address))
            .await;
    }

    /// Grow the selected page by one page size and fetch the larger window.
    pub async fn load_more(&self) {
        if !self.pager.is_visible() {
            debug!("history view hidden, not loading more");
            return;
        }
        if self.pager.extend_selected() {
            self.pager.fetch(self.api.as_ref(), &self.addresses, None).await;
        }
    }

    /// Back to the first page of the selected address.
    pub async fn reset(&self) {
        let Some(address) = self.pager.snapshot().selected_address().map(str::to_string) else {
            return;
        };
        self.pager.reset(&address, 0);
        self.pager
            .fetch(self.api.as_ref(), &self.addresses, Some(&address))
            .await;
    }

    /// Dispatch without waiting. For callers that render from the watch
    /// channel instead of awaiting.
    pub fn refresh(&self) -> Option<PageRequest> {
        let handle = self.pager.handle();
        let request = handle.begin(&self.addresses, None, self.pager.page_size())?;
        let api = self.api.clone();
        let in_flight = request.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_transactions(&in_flight.address, in_flight.from, in_flight.to)
                .await;
            handle.apply(&in_flight, result);
        });
        Some(request)
    }
}

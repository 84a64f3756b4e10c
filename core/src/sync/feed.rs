//! Per-view state container with generation-checked delivery.

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::debug;

use crate::web_data::WebData;

/// Snapshot published to subscribers on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    pub data: WebData<T>,
    /// Message of the latest failure that arrived while a success was on
    /// screen. Cleared by the next delivery.
    pub stale_error: Option<String>,
    generation: u64,
    applied: u64,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: WebData::NotRequested,
            stale_error: None,
            generation: 0,
            applied: 0,
        }
    }
}

/// Identifies one dispatched fetch. A ticket may write its result only if
/// no later ticket has written first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Owning handle to a view's remote data. Dropping it drops the state, and
/// any [`FeedSink`] still held by an in-flight fetch becomes a no-op.
pub struct Feed<T> {
    state: Arc<watch::Sender<FeedState<T>>>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Feed<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FeedState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Record a new dispatch: bump the generation and show `Pending` unless
    /// there is a success to keep on screen.
    pub fn dispatch(&self) -> Ticket {
        dispatch(&self.state)
    }

    /// Weak write handle for an in-flight fetch.
    pub fn sink(&self) -> FeedSink<T> {
        FeedSink {
            state: Arc::downgrade(&self.state),
        }
    }

    pub fn deliver(&self, ticket: Ticket, result: WebData<T>) -> bool {
        self.sink().deliver(ticket, result)
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<T>> {
        self.state.subscribe()
    }
}

impl<T: Clone> Feed<T> {
    pub fn snapshot(&self) -> FeedState<T> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> WebData<T> {
        self.state.borrow().data.clone()
    }
}

fn dispatch<T>(state: &watch::Sender<FeedState<T>>) -> Ticket {
    let mut generation = 0;
    state.send_modify(|state| {
        state.generation += 1;
        generation = state.generation;
        let current = std::mem::replace(&mut state.data, WebData::NotRequested);
        state.data = current.into_pending();
    });
    debug!(generation, "fetch dispatched");
    Ticket { generation }
}

pub struct FeedSink<T> {
    state: Weak<watch::Sender<FeedState<T>>>,
}

impl<T> Clone for FeedSink<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> FeedSink<T> {
    /// Same as [`Feed::dispatch`], for poll tasks that only hold a sink.
    /// `None` once the feed is gone.
    pub fn dispatch(&self) -> Option<Ticket> {
        let state = self.state.upgrade()?;
        Some(dispatch(&state))
    }

    /// Apply a fetch result. Returns `false` when the result was discarded,
    /// either because a result from a later dispatch has already landed or
    /// because the owning view no longer exists.
    pub fn deliver(&self, ticket: Ticket, result: WebData<T>) -> bool {
        let Some(state) = self.state.upgrade() else {
            debug!(generation = ticket.generation, "view dropped, discarding result");
            return false;
        };

        state.send_if_modified(|current| {
            if ticket.generation <= current.applied {
                debug!(
                    generation = ticket.generation,
                    applied = current.applied,
                    "discarding stale result"
                );
                return false;
            }
            current.applied = ticket.generation;
            current.stale_error = match (&current.data, &result) {
                (WebData::Succeeded(_), WebData::Failed(msg)) => Some(msg.clone()),
                _ => None,
            };
            let previous = std::mem::replace(&mut current.data, WebData::NotRequested);
            current.data = previous.settle(result);
            true
        })
    }
}

//! Four-state container for the outcome of an asynchronous fetch.
//!
//! Every panel keeps its remote data in a `WebData<T>`. Transitions are
//! pure: each operation consumes or borrows a value and returns a new one.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebData<T> {
    /// Nothing has been dispatched yet.
    NotRequested,
    /// A request is in flight and there is no earlier success to show.
    Pending,
    Succeeded(T),
    /// Human-readable failure message.
    Failed(String),
}

impl<T> Default for WebData<T> {
    fn default() -> Self {
        WebData::NotRequested
    }
}

impl<T> WebData<T> {
    pub fn is_not_requested(&self) -> bool {
        matches!(self, WebData::NotRequested)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WebData::Pending)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, WebData::Succeeded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WebData::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            WebData::Succeeded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WebData::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// The success payload, or `default()` for any other state.
    pub fn value_or_else(self, default: impl FnOnce() -> T) -> T {
        match self {
            WebData::Succeeded(v) => v,
            _ => default(),
        }
    }

    /// The failure message, or `default()` for any other state.
    pub fn error_or_else(&self, default: impl FnOnce() -> String) -> String {
        match self {
            WebData::Failed(msg) => msg.clone(),
            _ => default(),
        }
    }

    /// Total case analysis: exactly one of the four arms runs.
    pub fn fold<R>(
        self,
        not_requested: impl FnOnce() -> R,
        pending: impl FnOnce() -> R,
        succeeded: impl FnOnce(T) -> R,
        failed: impl FnOnce(String) -> R,
    ) -> R {
        match self {
            WebData::NotRequested => not_requested(),
            WebData::Pending => pending(),
            WebData::Succeeded(v) => succeeded(v),
            WebData::Failed(msg) => failed(msg),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WebData<U> {
        match self {
            WebData::NotRequested => WebData::NotRequested,
            WebData::Pending => WebData::Pending,
            WebData::Succeeded(v) => WebData::Succeeded(f(v)),
            WebData::Failed(msg) => WebData::Failed(msg),
        }
    }

    pub fn as_ref(&self) -> WebData<&T> {
        match self {
            WebData::NotRequested => WebData::NotRequested,
            WebData::Pending => WebData::Pending,
            WebData::Succeeded(v) => WebData::Succeeded(v),
            WebData::Failed(msg) => WebData::Failed(msg.clone()),
        }
    }

    /// State to show while a refresh is in flight: a success stays visible
    /// (stale), anything else becomes `Pending`.
    #[must_use]
    pub fn into_pending(self) -> Self {
        match self {
            WebData::Succeeded(v) => WebData::Succeeded(v),
            _ => WebData::Pending,
        }
    }

    /// Merge a freshly delivered result into the current one. A failure never
    /// replaces a success; every other delivery wins.
    #[must_use]
    pub fn settle(self, incoming: Self) -> Self {
        match (self, incoming) {
            (current @ WebData::Succeeded(_), WebData::Failed(_)) => current,
            (_, incoming) => incoming,
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for WebData<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => WebData::Succeeded(v),
            Err(e) => WebData::Failed(e.to_string()),
        }
    }
}

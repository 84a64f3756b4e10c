//! Per-screen state owners. Each view owns its containers and its poller;
//! the session switches them on and off.

mod history;
mod receive;
mod send;

pub use history::HistoryView;
pub use receive::AccountsView;
pub use send::SendView;

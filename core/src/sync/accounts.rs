//! Concurrent balance lookup for every wallet address.

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::network::{Account, ChainApi};
use crate::web_data::WebData;

/// Fetch all accounts at once. All-or-nothing: the first failure to
/// resolve becomes the result and the other lookups are dropped.
/// On success the accounts come back in `addresses` order.
pub async fn fetch_accounts(api: &dyn ChainApi, addresses: &[String]) -> WebData<Vec<Account>> {
    let lookups = addresses.iter().map(|address| api.fetch_account(address));
    match try_join_all(lookups).await {
        Ok(accounts) => {
            debug!(count = accounts.len(), "accounts fetched");
            WebData::Succeeded(accounts)
        }
        Err(e) => {
            warn!(error = %e, "account fetch failed");
            WebData::Failed(e.to_string())
        }
    }
}

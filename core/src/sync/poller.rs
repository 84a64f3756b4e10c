//! Fetch-on-activation with a fixed re-poll interval.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// The scheduled re-fetch loop of one active view. Dropping the handle
/// cancels the loop; fetches it already dispatched keep running.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Scheduler owned by a view. The view only calls [`start`](Poller::start)
/// and [`stop`](Poller::stop); at most one re-poll loop exists at a time.
#[derive(Debug)]
pub struct Poller {
    name: &'static str,
    interval: Duration,
    handle: Option<PollHandle>,
}

impl Poller {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Invoke `fetch` now, then again every interval until stopped.
    ///
    /// Each invocation runs as its own task, so a slow fetch neither delays
    /// the next tick nor gets cancelled by [`stop`](Poller::stop). Calling
    /// `start` on a running poller replaces the previous loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F, Fut>(&mut self, fetch: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        tokio::spawn(fetch());

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let interval = self.interval;
        let name = self.name;
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                debug!(poller = name, "re-polling");
                tokio::spawn(fetch());
            }
            debug!(poller = name, "poll loop stopped");
        });

        debug!(poller = name, interval_secs = interval.as_secs(), "poller started");
        self.handle = Some(PollHandle { token, task });
    }

    /// Cancel the pending re-poll. In-flight fetches are not affected.
    pub fn stop(&mut self) {
        if self.handle.take().is_some() {
            debug!(poller = self.name, "poller stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

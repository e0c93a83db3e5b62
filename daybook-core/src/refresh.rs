//! Background feed refresh.
//!
//! The refresh loop runs on its own tokio task: it fetches immediately,
//! publishes the snapshot, then waits out the interval. The wait is raced
//! against a cancellation token so a stop request lands right away instead of
//! after the full interval. A fetch already in flight is not interrupted; it
//! finishes (or hits its per-request timeout) and its snapshot is published
//! whole before the loop exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::feed::{FeedClient, FeedSnapshot, FeedTransport};

/// Default time between scheduled fetch cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Default per-request timeout for feed downloads.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub struct RefreshLoop<T> {
    client: Arc<FeedClient<T>>,
    interval: Duration,
    timeout: Duration,
}

impl<T: FeedTransport> RefreshLoop<T> {
    pub fn new(client: Arc<FeedClient<T>>, interval: Duration, timeout: Duration) -> Self {
        RefreshLoop {
            client,
            interval,
            timeout,
        }
    }

    /// Start the loop on a new task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> RefreshHandle {
        let cancel_token = CancellationToken::new();
        let (tx, rx) = watch::channel(self.client.snapshot());

        let task = tokio::spawn(self.run(tx, cancel_token.clone()));

        RefreshHandle {
            cancel_token,
            updates: rx,
            task,
        }
    }

    async fn run(self, tx: watch::Sender<Arc<FeedSnapshot>>, cancel_token: CancellationToken) {
        debug!(interval = ?self.interval, "feed refresh loop started");

        loop {
            let snapshot = self.client.fetch_all(self.timeout).await;
            // Receivers may all be gone; the client still holds the snapshot
            tx.send_replace(snapshot);

            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("feed refresh loop stopped");
    }
}

/// Handle to a running refresh loop.
pub struct RefreshHandle {
    cancel_token: CancellationToken,
    updates: watch::Receiver<Arc<FeedSnapshot>>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Receiver that is notified after every completed cycle.
    pub fn subscribe(&self) -> watch::Receiver<Arc<FeedSnapshot>> {
        self.updates.clone()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<FeedSnapshot> {
        self.updates.borrow().clone()
    }

    /// Token that stops the loop when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request a stop and wait for the loop to exit.
    pub async fn stop(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "feed refresh task panicked");
        }
    }
}

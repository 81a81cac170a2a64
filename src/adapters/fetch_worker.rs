//! Background reference-price fetch.
//!
//! The fetch runs on its own thread; the result comes back over a channel so
//! the caller can apply it to the ledger from the thread that owns it.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::error::LedgerError;
use crate::domain::reference::ReferencePrices;
use crate::ports::price_port::PriceFeed;

pub type FetchResult = Result<ReferencePrices, LedgerError>;

pub struct PendingFetch {
    rx: Receiver<FetchResult>,
}

impl PendingFetch {
    /// Block for at most `timeout`.
    pub fn wait_timeout(self, timeout: Duration) -> FetchResult {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(LedgerError::fetch(format!(
                "no response within {}s",
                timeout.as_secs()
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(worker_gone()),
        }
    }
}

fn worker_gone() -> LedgerError {
    LedgerError::fetch("fetch worker exited without a result")
}

/// Start `feed.fetch()` on a worker thread.
pub fn spawn_fetch<F>(feed: F) -> PendingFetch
where
    F: PriceFeed + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = feed.fetch();
        match &result {
            Ok(prices) => info!(entries = prices.len(), "background fetch finished"),
            Err(e) => warn!(error = %e, "background fetch failed"),
        }
        // The receiver may have been dropped; nothing to do then.
        let _ = tx.send(result);
    });
    PendingFetch { rx }
}

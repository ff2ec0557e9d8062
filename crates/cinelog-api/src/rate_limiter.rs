//! Request pacing shared by the HTTP clients.

use std::time::{Duration, Instant};

/// Default minimum spacing for TMDB requests (~40 req/s).
pub const CATALOG_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// Default minimum spacing for the local store. It runs on localhost,
/// so no pacing is applied unless configured.
pub const STORE_MIN_INTERVAL: Duration = Duration::ZERO;

/// Single-tier pacer enforcing a minimum interval between requests.
///
/// Held behind a `tokio::sync::Mutex` by each client so that concurrent
/// enrichment requests queue up instead of bursting.
#[derive(Debug)]
pub struct RequestPacer {
    /// Minimum interval between request starts.
    min_interval: Duration,
    /// Start of the previous request.
    last_request: Option<Instant>,
}

impl RequestPacer {
    /// Creates a pacer with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Sleeps until the next request may start, then records the start time.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval.saturating_sub(elapsed)).await;
            }
        }

        self.last_request = Some(Instant::now());
    }
}

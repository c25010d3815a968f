//! Visit counter
//!
//! Counts distinct visitors: a client, identified by a short hash of its
//! network origin, increments the counter at most once per window.

pub mod http;
pub mod store;

pub use store::{CounterStore, MemoryCounterStore, SledCounterStore};

use crate::error::CounterError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Served in place of the count when no store is available.
pub const PLACEHOLDER: &str = "???????";

/// Minimum rendered width of the count.
pub const COUNT_WIDTH: usize = 7;

/// Zero-padded decimal rendering of a count.
pub fn format_count(count: u64) -> String {
    format!("{:0width$}", count, width = COUNT_WIDTH)
}

/// Store key for a client origin: 16 bits of its blake3 hash, hex-encoded.
///
/// A missing origin hashes the empty string, so all such clients share a key.
pub fn client_key(origin: Option<&str>) -> String {
    let hash = blake3::hash(origin.unwrap_or("").as_bytes());
    hex::encode(&hash.as_bytes()[..2])
}

/// Read-modify-write counter over a `CounterStore`
pub struct VisitCounter {
    store: Arc<dyn CounterStore>,
    window: Duration,
    // Serializes read-modify-write within this process.
    update: Mutex<()>,
}

impl VisitCounter {
    pub fn new(store: Arc<dyn CounterStore>, window: Duration) -> Self {
        Self {
            store,
            window,
            update: Mutex::new(()),
        }
    }

    /// Record a visit at `now` and return the resulting count.
    pub async fn hit(&self, origin: Option<&str>, now: DateTime<Utc>) -> Result<u64, CounterError> {
        let _guard = self.update.lock().await;

        let mut count = self.store.load_count().await?;
        let key = client_key(origin);
        let last = self.store.last_access(&key).await?.unwrap_or(0);
        let now_millis = now.timestamp_millis();
        let window_millis = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);

        if now_millis.saturating_sub(last) >= window_millis {
            count += 1;
            self.store.count_visit(&key, now_millis, count).await?;
            debug!(client = %key, count, "Counted visit");
        } else {
            debug!(client = %key, count, "Repeat visit inside window");
        }

        Ok(count)
    }

    /// Current count without recording a visit.
    pub async fn current(&self) -> Result<u64, CounterError> {
        self.store.load_count().await
    }
}

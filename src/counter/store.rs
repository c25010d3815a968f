//! Counter persistence

use crate::error::CounterError;
use async_trait::async_trait;
use parking_lot::Mutex;
use sled::transaction::{ConflictableTransactionResult, TransactionError, Transactional};
use std::collections::HashMap;
use std::path::Path;

/// Backing store for the visit counter.
///
/// Timestamps are Unix milliseconds.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current count; zero when never written
    async fn load_count(&self) -> Result<u64, CounterError>;

    async fn store_count(&self, count: u64) -> Result<(), CounterError>;

    /// Last counted visit of a client, if any
    async fn last_access(&self, client: &str) -> Result<Option<i64>, CounterError>;

    async fn record_access(&self, client: &str, at_millis: i64) -> Result<(), CounterError>;

    /// Store a new count and the visit that produced it as one write.
    async fn count_visit(
        &self,
        client: &str,
        at_millis: i64,
        count: u64,
    ) -> Result<(), CounterError>;
}

const COUNT_KEY: &[u8] = b"count";
const VISITORS_TREE: &str = "visitors";

/// Sled-based implementation of CounterStore
pub struct SledCounterStore {
    db: sled::Db,
    visitors: sled::Tree,
}

impl SledCounterStore {
    /// Open (or create) the counter database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CounterError> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            CounterError::Unavailable(format!(
                "Failed to open counter database {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        let visitors = db.open_tree(VISITORS_TREE)?;
        Ok(Self { db, visitors })
    }
}

fn decode_u64(bytes: &[u8]) -> Result<u64, CounterError> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| CounterError::Storage("Corrupt counter value".to_string()))?;
    Ok(u64::from_be_bytes(array))
}

fn decode_i64(bytes: &[u8]) -> Result<i64, CounterError> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| CounterError::Storage("Corrupt visitor timestamp".to_string()))?;
    Ok(i64::from_be_bytes(array))
}

#[async_trait]
impl CounterStore for SledCounterStore {
    async fn load_count(&self) -> Result<u64, CounterError> {
        match self.db.get(COUNT_KEY)? {
            Some(value) => decode_u64(&value),
            None => Ok(0),
        }
    }

    async fn store_count(&self, count: u64) -> Result<(), CounterError> {
        self.db.insert(COUNT_KEY, count.to_be_bytes().to_vec())?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn last_access(&self, client: &str) -> Result<Option<i64>, CounterError> {
        match self.visitors.get(client.as_bytes())? {
            Some(value) => decode_i64(&value).map(Some),
            None => Ok(None),
        }
    }

    async fn record_access(&self, client: &str, at_millis: i64) -> Result<(), CounterError> {
        self.visitors
            .insert(client.as_bytes(), at_millis.to_be_bytes().to_vec())?;
        Ok(())
    }

    async fn count_visit(
        &self,
        client: &str,
        at_millis: i64,
        count: u64,
    ) -> Result<(), CounterError> {
        let counts: &sled::Tree = &self.db;
        (counts, &self.visitors)
            .transaction(|(counts, visitors)| -> ConflictableTransactionResult<(), ()> {
                counts.insert(COUNT_KEY, count.to_be_bytes().to_vec())?;
                visitors.insert(client.as_bytes(), at_millis.to_be_bytes().to_vec())?;
                Ok(())
            })
            .map_err(|e: TransactionError<()>| {
                CounterError::Storage(format!("Visit transaction failed: {:?}", e))
            })?;
        self.db.flush_async().await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    count: u64,
    visitors: HashMap<String, i64>,
}

/// In-process store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    state: Mutex<MemoryState>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store starting from an existing count.
    pub fn with_count(count: u64) -> Self {
        let store = Self::default();
        store.state.lock().count = count;
        store
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn load_count(&self) -> Result<u64, CounterError> {
        Ok(self.state.lock().count)
    }

    async fn store_count(&self, count: u64) -> Result<(), CounterError> {
        self.state.lock().count = count;
        Ok(())
    }

    async fn last_access(&self, client: &str) -> Result<Option<i64>, CounterError> {
        Ok(self.state.lock().visitors.get(client).copied())
    }

    async fn record_access(&self, client: &str, at_millis: i64) -> Result<(), CounterError> {
        self.state
            .lock()
            .visitors
            .insert(client.to_string(), at_millis);
        Ok(())
    }

    async fn count_visit(
        &self,
        client: &str,
        at_millis: i64,
        count: u64,
    ) -> Result<(), CounterError> {
        let mut state = self.state.lock();
        state.count = count;
        state.visitors.insert(client.to_string(), at_millis);
        Ok(())
    }
}

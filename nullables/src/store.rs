//! Thread-safe in-memory trust-key store for testing.

use async_trait::async_trait;
use roundseed_store::{StoreError, TrustKeyStore};
use roundseed_types::{RoundTimestamp, TrustKeyRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// An in-memory trust-key collection for one server.
///
/// Thread-safe for use with tokio's multi-threaded runtime. Lookups are
/// counted so tests can assert that a gate stopped a request before it
/// reached the store.
pub struct NullTrustKeyStore {
    records: Mutex<HashMap<RoundTimestamp, TrustKeyRecord>>,
    failure: Mutex<Option<StoreError>>,
    delay: Mutex<Option<Duration>>,
    lookups: AtomicUsize,
}

impl NullTrustKeyStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Insert or replace the record for its round.
    pub fn insert(&self, record: TrustKeyRecord) {
        self.records.lock().unwrap().insert(record.round, record);
    }

    /// Flip the trust verdict of an existing record.
    pub fn set_trusted(&self, round: RoundTimestamp, trusted: bool) {
        if let Some(record) = self.records.lock().unwrap().get_mut(&round) {
            record.is_trusted = trusted;
        }
    }

    /// Make every subsequent lookup fail with a backend error.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(StoreError::Backend(reason.into()));
    }

    /// Make every subsequent lookup fail as if the backend were unreachable.
    pub fn go_offline(&self, reason: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(StoreError::Unavailable(reason.into()));
    }

    /// Clear an injected failure.
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Delay every subsequent lookup by `delay` (simulated I/O latency).
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Number of lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Default for NullTrustKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrustKeyStore for NullTrustKeyStore {
    async fn find(&self, round: RoundTimestamp) -> Result<Option<TrustKeyRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.records.lock().unwrap().get(&round).cloned())
    }
}

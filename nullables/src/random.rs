//! Deterministic seed bytes for testing.

use roundseed_crypto::{CryptoError, SeedSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A deterministic seed source for testing.
///
/// Every call returns a distinct, reproducible buffer derived from a call
/// counter. It can be told to fail or to return short buffers.
pub struct NullSeedSource {
    calls: AtomicU64,
    fail_with: Mutex<Option<String>>,
    shortfall: Mutex<usize>,
}

impl NullSeedSource {
    pub fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            fail_with: Mutex::new(None),
            shortfall: Mutex::new(0),
        }
    }

    /// Make every subsequent call fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.fail_with.lock().unwrap() = Some(reason.into());
    }

    /// Make every subsequent call return `missing` fewer bytes than requested.
    pub fn return_short_by(&self, missing: usize) {
        *self.shortfall.lock().unwrap() = missing;
    }

    /// Number of calls made so far (including failed ones).
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// The bytes call number `call` (zero-based) returns for `len`.
    pub fn expected_bytes(call: u64, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| (call as u8).wrapping_mul(31).wrapping_add(i as u8).wrapping_add(1))
            .collect()
    }
}

impl Default for NullSeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedSource for NullSeedSource {
    fn generate(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.fail_with.lock().unwrap().clone() {
            return Err(CryptoError::RandomSource(reason));
        }
        let shortfall = *self.shortfall.lock().unwrap();
        Ok(Self::expected_bytes(call, len.saturating_sub(shortfall)))
    }

    fn name(&self) -> &str {
        "null-seed"
    }
}

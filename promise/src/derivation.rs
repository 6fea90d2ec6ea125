//! Bounded keystream derivation.
//!
//! Argon2d is CPU and memory heavy, so derivations run on the blocking thread
//! pool behind a semaphore. A derivation holds its permit until the blocking
//! work finishes, even if the caller stopped waiting on a timeout, so the
//! number of live derivations never exceeds the configured limit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use zeroize::Zeroizing;

use roundseed_crypto::derive_keystream;
use roundseed_types::CostParams;

use crate::PromiseError;

/// Everything needed to derive one keystream.
pub struct KeystreamJob {
    /// The trust key's input material (Argon2 password).
    pub inputs: Vec<u8>,
    /// The decoded committed secret (Argon2 salt).
    pub salt: Zeroizing<Vec<u8>>,
    pub output_len: usize,
    pub costs: CostParams,
}

/// Runs keystream derivations with bounded concurrency and an optional timeout.
#[derive(Clone)]
pub struct DerivationPool {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    timeout: Option<Duration>,
    started: Arc<AtomicU64>,
}

impl DerivationPool {
    pub fn new(max_concurrent: usize, timeout: Option<Duration>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            timeout,
            started: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Derive the keystream for `job`, waiting for a free slot first.
    pub async fn derive(&self, job: KeystreamJob) -> Result<Zeroizing<Vec<u8>>, PromiseError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| PromiseError::Derivation(e.to_string()))?;
        self.started.fetch_add(1, Ordering::Relaxed);

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            derive_keystream(&job.inputs, &job.salt, job.output_len, &job.costs)
        });

        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, handle)
                .await
                .map_err(|_| PromiseError::DerivationTimeout(limit))?,
            None => handle.await,
        };

        joined
            .map_err(|e| PromiseError::Derivation(format!("derivation task failed: {e}")))?
            .map_err(|e| PromiseError::Derivation(e.to_string()))
    }

    /// Returns the maximum concurrency limit.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of derivation slots currently free.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Derivations handed to the blocking pool since creation, shared by clones.
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }
}

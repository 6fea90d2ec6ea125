//! Trust-key store trait and lookup classification.

use async_trait::async_trait;
use roundseed_types::{RoundTimestamp, TrustKeyRecord};

use crate::StoreError;

/// Read-only access to one server's committed trust keys.
///
/// A lookup may suspend on database I/O. Implementations must be safe to
/// query from many resolutions concurrently.
#[async_trait]
pub trait TrustKeyStore: Send + Sync {
    /// Point lookup of the record committed for `round`.
    ///
    /// ## Returns
    ///
    /// - `Ok(Some(record))` if a record exists, trusted or not.
    /// - `Ok(None)` if nothing was committed for the round.
    /// - `Err(StoreError)` on I/O or database failure.
    async fn find(&self, round: RoundTimestamp) -> Result<Option<TrustKeyRecord>, StoreError>;
}

/// Outcome of a successful trust-key lookup.
///
/// Together with `Err(StoreError)` this covers the four lookup outcomes the
/// promise core distinguishes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrustLookup {
    /// Record exists and the verdict is trusted.
    Trusted(TrustKeyRecord),
    /// Record exists but has not been marked trusted.
    Untrusted(TrustKeyRecord),
    /// No record was committed for the round.
    NotFound,
}

impl TrustLookup {
    pub fn classify(found: Option<TrustKeyRecord>) -> Self {
        match found {
            Some(record) if record.is_trusted => TrustLookup::Trusted(record),
            Some(record) => TrustLookup::Untrusted(record),
            None => TrustLookup::NotFound,
        }
    }
}

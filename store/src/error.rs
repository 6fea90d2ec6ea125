use thiserror::Error;

/// Failures a trust-key backend reports on lookup.
#[derive(Clone, Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

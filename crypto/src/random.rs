//! Secure random byte sources for promise seeds.

use crate::CryptoError;

/// Source of cryptographically secure random bytes.
pub trait SeedSource: Send + Sync {
    /// Fill a fresh buffer of `len` bytes.
    fn generate(&self, len: usize) -> Result<Vec<u8>, CryptoError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}

/// Seed source backed by the operating system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSeedSource;

impl SeedSource for OsSeedSource {
    fn generate(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut buf = vec![0u8; len];
        getrandom::getrandom(&mut buf).map_err(|e| CryptoError::RandomSource(e.to_string()))?;
        Ok(buf)
    }

    fn name(&self) -> &str {
        "os"
    }
}

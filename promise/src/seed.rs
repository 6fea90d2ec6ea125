//! Seed issuance.

use roundseed_crypto::SeedSource;

use crate::PromiseError;

/// Draw exactly `n_bytes` fresh bytes from `source`.
///
/// A source that fails, or returns a buffer of the wrong length, is reported
/// as a seed generation failure; no seed is issued in either case.
pub fn generate_seed(source: &dyn SeedSource, n_bytes: usize) -> Result<Vec<u8>, PromiseError> {
    let seed = source.generate(n_bytes).map_err(|e| {
        PromiseError::SeedGeneration(format!("{} source failed: {e}", source.name()))
    })?;
    if seed.len() != n_bytes {
        return Err(PromiseError::SeedGeneration(format!(
            "{} source returned {} bytes, expected {}",
            source.name(),
            seed.len(),
            n_bytes
        )));
    }
    Ok(seed)
}

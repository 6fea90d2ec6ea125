//! Memory-hard keystream derivation.
//!
//! The keystream is the raw Argon2d output over the trust key's input material,
//! salted with the committed secret (Argon2d, version 0x13, no encoding).
//!
//! Derivation is deterministic: the same inputs, salt, length and costs always
//! produce the same bytes.

use argon2::{Algorithm, Argon2, Params, Version};
use roundseed_types::CostParams;
use zeroize::Zeroizing;

use crate::CryptoError;

/// Smallest keystream Argon2 can produce.
pub const MIN_KEYSTREAM_LEN: usize = 4;
/// Largest keystream Argon2 can produce.
pub const MAX_KEYSTREAM_LEN: usize = u32::MAX as usize;

/// Derive exactly `output_len` keystream bytes.
///
/// The returned buffer is wiped on drop.
pub fn derive_keystream(
    inputs: &[u8],
    salt: &[u8],
    output_len: usize,
    costs: &CostParams,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if !(MIN_KEYSTREAM_LEN..=MAX_KEYSTREAM_LEN).contains(&output_len) {
        return Err(CryptoError::InvalidLength(output_len));
    }

    let params = Params::new(
        costs.memory_cost,
        costs.time_cost,
        costs.parallelism,
        Some(output_len),
    )
    .map_err(|e| CryptoError::InvalidParams(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2d, Version::V0x13, params);

    let mut output = Zeroizing::new(vec![0u8; output_len]);
    argon2
        .hash_password_into(inputs, salt, &mut output)
        .map_err(|e| CryptoError::Hash(e.to_string()))?;

    Ok(output)
}

//! Decoding of committed trust-key secrets.

use crate::CryptoError;

/// Minimum salt length accepted by Argon2.
pub const MIN_SALT_LEN: usize = 8;

/// Decode a hex-encoded committed secret into the raw Argon2 salt.
pub fn decode_committed_secret(trustkey_hex: &str) -> Result<Vec<u8>, CryptoError> {
    let salt =
        hex::decode(trustkey_hex).map_err(|e| CryptoError::SecretEncoding(e.to_string()))?;
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::SecretTooShort {
            actual: salt.len(),
            minimum: MIN_SALT_LEN,
        });
    }
    Ok(salt)
}

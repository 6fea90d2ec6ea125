use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("length mismatch: seed is {seed} bytes, keystream is {keystream} bytes")]
    LengthMismatch { seed: usize, keystream: usize },

    #[error("invalid keystream length {0}")]
    InvalidLength(usize),

    #[error("invalid cost parameters: {0}")]
    InvalidParams(String),

    #[error("committed secret is not valid hex: {0}")]
    SecretEncoding(String),

    #[error("committed secret too short: {actual} bytes, need at least {minimum}")]
    SecretTooShort { actual: usize, minimum: usize },

    #[error("random source failed: {0}")]
    RandomSource(String),

    #[error("Argon2 hashing failed: {0}")]
    Hash(String),
}

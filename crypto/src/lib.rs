//! Cryptographic primitives for the roundseed promise protocol.
//!
//! - **Argon2d** keystream derivation from a committed trust key
//! - **XOR** blinding combiner for seed and keystream
//! - Decoding of hex-encoded committed secrets into Argon2 salts
//! - The [`SeedSource`] abstraction over a secure random byte source

pub mod combine;
pub mod error;
pub mod keystream;
pub mod random;
pub mod secret;

pub use combine::{combine, combine_in_place};
pub use error::CryptoError;
pub use keystream::{derive_keystream, MAX_KEYSTREAM_LEN, MIN_KEYSTREAM_LEN};
pub use random::{OsSeedSource, SeedSource};
pub use secret::{decode_committed_secret, MIN_SALT_LEN};

//! Blinding combiner: bytewise XOR of a seed with a keystream.
//!
//! Runs in time independent of the byte values. There is no comparison and no
//! early exit, only one XOR per byte over the full length.

use crate::CryptoError;

/// XOR `seed` with `keystream`, returning a new buffer.
pub fn combine(seed: &[u8], keystream: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut out = seed.to_vec();
    combine_in_place(&mut out, keystream)?;
    Ok(out)
}

/// XOR `keystream` into `seed` in place.
///
/// The buffers must be the same length; nothing is written otherwise.
pub fn combine_in_place(seed: &mut [u8], keystream: &[u8]) -> Result<(), CryptoError> {
    if seed.len() != keystream.len() {
        return Err(CryptoError::LengthMismatch {
            seed: seed.len(),
            keystream: keystream.len(),
        });
    }
    for (s, k) in seed.iter_mut().zip(keystream) {
        *s ^= *k;
    }
    Ok(())
}

//! Trust-key records committed by the external consensus process.

use serde::{Deserialize, Serialize};

use crate::RoundTimestamp;

/// A committed trust key for one server round.
///
/// Written and later flipped to trusted by a process outside this workspace;
/// the promise core reads a record exactly once per resolution and never
/// modifies it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustKeyRecord {
    /// Round the key was committed for (lookup key within a server's collection).
    #[serde(rename = "ts")]
    pub round: RoundTimestamp,
    /// Hex-encoded committed secret, used as the keystream salt.
    pub trustkey: String,
    /// Input material, used as the keystream's primary input.
    #[serde(with = "crate::serde_b64")]
    pub inputs: Vec<u8>,
    /// Verdict written by the verification process.
    pub is_trusted: bool,
}

impl TrustKeyRecord {
    pub fn new(
        round: RoundTimestamp,
        trustkey: impl Into<String>,
        inputs: impl Into<Vec<u8>>,
        is_trusted: bool,
    ) -> Self {
        Self {
            round,
            trustkey: trustkey.into(),
            inputs: inputs.into(),
            is_trusted,
        }
    }
}

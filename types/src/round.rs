//! Round timestamp type.
//!
//! A round is a fixed-duration window identified by the Unix timestamp (seconds)
//! at which it starts. Servers publish their round duration; a timestamp names a
//! valid round of that server only when it is an exact multiple of the duration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Start of a synchronized time round, in Unix epoch seconds (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundTimestamp(u64);

impl RoundTimestamp {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Remainder of this timestamp modulo a round duration.
    ///
    /// Returns `None` for a zero duration.
    pub fn offset_within(&self, round_duration: u64) -> Option<u64> {
        self.0.checked_rem(round_duration)
    }
}

impl fmt::Display for RoundTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl From<u64> for RoundTimestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

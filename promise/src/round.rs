//! Round alignment gate.

use roundseed_types::RoundTimestamp;

/// Whether a timestamp falls on a round boundary of a server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundAlignment {
    Aligned,
    Misaligned,
}

impl RoundAlignment {
    pub fn is_aligned(self) -> bool {
        self == RoundAlignment::Aligned
    }
}

/// A timestamp is aligned when it is an exact multiple of the round duration.
/// A zero duration has no boundaries, so nothing aligns to it.
pub fn check_alignment(round: RoundTimestamp, round_duration: u64) -> RoundAlignment {
    match round.offset_within(round_duration) {
        Some(0) => RoundAlignment::Aligned,
        _ => RoundAlignment::Misaligned,
    }
}

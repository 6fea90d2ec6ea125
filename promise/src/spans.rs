//! Pre-built [`tracing::Span`] constructors for promise operations.
//!
//! Every request gets a span with the same name and fields, so all events for
//! one promise can be correlated.

use tracing::{info_span, Span};

use roundseed_types::{RoundTimestamp, ServerId};

/// Span covering a single create request.
pub fn promise_create_span(server_id: &ServerId, round: RoundTimestamp) -> Span {
    info_span!("promise_create", server = %server_id, round = %round)
}

/// Span covering a single resolve request, including keystream derivation.
pub fn promise_resolve_span(server_id: &ServerId, round: RoundTimestamp) -> Span {
    info_span!("promise_resolve", server = %server_id, round = %round)
}

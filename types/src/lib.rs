//! Fundamental types for the roundseed promise protocol.
//!
//! This crate defines the values shared across every other crate in the workspace:
//! server identifiers, round timestamps, Argon2 cost parameters and the
//! trust-key records committed by the external consensus process.

pub mod cost;
pub mod round;
pub mod serde_b64;
pub mod server;
pub mod trust_key;

pub use cost::{CostOverrides, CostParams};
pub use round::RoundTimestamp;
pub use server::ServerId;
pub use trust_key::TrustKeyRecord;

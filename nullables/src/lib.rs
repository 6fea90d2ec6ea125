//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the promise core (server registry, trust-key
//! store, random source) are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (failures, delays, verdict flips)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod random;
pub mod registry;
pub mod store;

pub use random::NullSeedSource;
pub use registry::NullRegistry;
pub use store::NullTrustKeyStore;

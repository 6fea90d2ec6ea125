//! Collaborator traits for the roundseed promise core.
//!
//! The server registry and the trust-key store are owned by processes outside
//! this workspace. Every backend (database driver, in-memory for testing)
//! implements these traits; the promise core depends only on the traits.

pub mod error;
pub mod registry;
pub mod trust_key;

pub use error::StoreError;
pub use registry::{ServerDescriptor, ServerRegistry};
pub use trust_key::{TrustKeyStore, TrustLookup};

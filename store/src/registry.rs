//! Server/supervisor registry.

use std::fmt;
use std::sync::Arc;

use roundseed_types::ServerId;

use crate::TrustKeyStore;

/// What the registry knows about one server.
#[derive(Clone)]
pub struct ServerDescriptor {
    /// Whether the server's supervisor currently holds a live session.
    pub connected: bool,
    /// Round duration in seconds. Zero is a registry misconfiguration.
    pub round_duration: u64,
    /// The server's trust-key collection.
    pub trust_keys: Arc<dyn TrustKeyStore>,
}

impl fmt::Debug for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerDescriptor")
            .field("connected", &self.connected)
            .field("round_duration", &self.round_duration)
            .finish_non_exhaustive()
    }
}

/// Lookup of servers by identifier.
pub trait ServerRegistry: Send + Sync {
    /// Return the descriptor for `server_id`, or `None` if it is unknown.
    fn lookup(&self, server_id: &ServerId) -> Option<ServerDescriptor>;
}

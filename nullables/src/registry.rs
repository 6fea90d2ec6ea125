//! In-memory server registry for testing.

use roundseed_store::{ServerDescriptor, ServerRegistry};
use roundseed_types::ServerId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::NullTrustKeyStore;

/// An in-memory server registry for testing.
pub struct NullRegistry {
    servers: Mutex<HashMap<ServerId, ServerDescriptor>>,
}

impl NullRegistry {
    pub fn new() -> Self {
        Self {
            servers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a connected server backed by a fresh [`NullTrustKeyStore`].
    ///
    /// Returns the store so tests can seed trust keys.
    pub fn add_server(&self, server_id: &str, round_duration: u64) -> Arc<NullTrustKeyStore> {
        let store = Arc::new(NullTrustKeyStore::new());
        self.register(
            server_id,
            ServerDescriptor {
                connected: true,
                round_duration,
                trust_keys: store.clone(),
            },
        );
        store
    }

    pub fn register(&self, server_id: &str, descriptor: ServerDescriptor) {
        self.servers
            .lock()
            .unwrap()
            .insert(ServerId::new(server_id), descriptor);
    }

    /// Flip the connectivity flag of a registered server.
    pub fn set_connected(&self, server_id: &str, connected: bool) {
        if let Some(descriptor) = self
            .servers
            .lock()
            .unwrap()
            .get_mut(&ServerId::new(server_id))
        {
            descriptor.connected = connected;
        }
    }

    pub fn remove(&self, server_id: &str) {
        self.servers.lock().unwrap().remove(&ServerId::new(server_id));
    }
}

impl Default for NullRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerRegistry for NullRegistry {
    fn lookup(&self, server_id: &ServerId) -> Option<ServerDescriptor> {
        self.servers.lock().unwrap().get(server_id).cloned()
    }
}

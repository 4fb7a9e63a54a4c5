//! Atomically swapped network versions.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::models::types::Result;
use crate::network::definition::NetworkDefinition;
use crate::network::model::Network;

/// Holds the current network version.
///
/// Readers clone the `Arc` and keep using that version for the whole
/// request. A reload builds and validates the next version outside the lock
/// and only swaps the pointer, so no reader ever observes a partial network.
pub struct NetworkStore {
    current: RwLock<Arc<Network>>,
}

impl NetworkStore {
    pub fn new(network: Network) -> Self {
        Self {
            current: RwLock::new(Arc::new(network)),
        }
    }

    /// Build the first version from a definition
    pub fn from_definition(definition: NetworkDefinition) -> Result<Self> {
        let network = Network::build(definition, 1)?;
        info!(
            version = network.version(),
            stops = network.stops().len(),
            routes = network.routes().len(),
            "network loaded"
        );
        Ok(Self::new(network))
    }

    /// The version current at the time of the call
    pub fn snapshot(&self) -> Arc<Network> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            // A writer panicked mid-swap; the stored Arc is still a whole version
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    /// Replace the network, or keep the last good version if the definition is invalid
    pub fn reload(&self, definition: NetworkDefinition) -> Result<Arc<Network>> {
        let next_version = self.version() + 1;
        let network = match Network::build(definition, next_version) {
            Ok(network) => Arc::new(network),
            Err(err) => {
                warn!(
                    retained_version = next_version - 1,
                    "network reload rejected: {err}"
                );
                return Err(err);
            }
        };

        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Concurrent reloads must still produce increasing versions
        let network = if guard.version() >= network.version() {
            Arc::new(Network::clone(&network).with_version(guard.version() + 1))
        } else {
            network
        };
        *guard = network.clone();
        drop(guard);

        info!(
            version = network.version(),
            stops = network.stops().len(),
            routes = network.routes().len(),
            "network reloaded"
        );
        Ok(network)
    }
}

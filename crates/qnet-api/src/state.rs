//! Application state for the network API server.

use std::net::SocketAddr;

use tokio::sync::RwLock;

use qnet_sim::NetworkSimulator;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,
    /// Registration cap; further `register` calls are rejected.
    pub max_nodes: usize,
    /// Key length used when `exchange_keys` omits `key_bytes`.
    pub default_key_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: ([127, 0, 0, 1], 8000).into(),
            max_nodes: 64,
            default_key_bytes: 16,
        }
    }
}

/// Shared application state.
///
/// All handlers funnel through the one simulator; writes take the lock for
/// the whole operation so protocol steps never interleave.
pub struct AppState {
    /// The simulator every request operates on.
    pub sim: RwLock<NetworkSimulator>,
    /// Server configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// Create application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create application state with custom configuration.
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            sim: RwLock::new(NetworkSimulator::new()),
            config,
        }
    }

    /// Replace the simulator, e.g. with a seeded or pre-built network.
    pub fn with_simulator(mut self, sim: NetworkSimulator) -> Self {
        self.sim = RwLock::new(sim);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

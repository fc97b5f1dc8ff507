//! Server configuration.

use deltasync_protocol::ProtocolFlavor;
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the delta server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Number of past snapshots retained for patch baselines.
    pub max_history: usize,
    /// Interval between background mutations.
    pub mutate_interval: Duration,
    /// Negotiation flavor served.
    pub flavor: ProtocolFlavor,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            max_history: 10,
            mutate_interval: Duration::from_secs(1),
            flavor: ProtocolFlavor::Delta,
        }
    }

    /// Sets the history capacity. Zero is clamped to one.
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max.max(1);
        self
    }

    /// Sets the mutation interval.
    pub fn with_mutate_interval(mut self, interval: Duration) -> Self {
        self.mutate_interval = interval;
        self
    }

    /// Sets the negotiation flavor.
    pub fn with_flavor(mut self, flavor: ProtocolFlavor) -> Self {
        self.flavor = flavor;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

//! Serve command implementation.

use deltasync_protocol::ProtocolFlavor;
use deltasync_server::{DeltaServer, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs the serve command until Ctrl-C.
pub fn run(
    bind: SocketAddr,
    max_history: usize,
    mutate_interval_ms: u64,
    flavor: ProtocolFlavor,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::new(bind)
        .with_max_history(max_history)
        .with_mutate_interval(Duration::from_millis(mutate_interval_ms))
        .with_flavor(flavor);
    info!("Serving {} document on {}", flavor, bind);
    let server = Arc::new(DeltaServer::new(config));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.serve())?;
    info!("Server on {} shut down", bind);
    Ok(())
}

//! Poll command implementation.

use deltasync_client::{ClientConfig, Poller, ReqwestClient, SinceStyle};
use deltasync_protocol::ProtocolFlavor;
use std::time::Duration;
use tracing::info;

/// Runs the poll command.
///
/// Polls forever unless `count` is given, then prints a summary.
pub fn run(
    server: String,
    poll_interval_ms: u64,
    flavor: ProtocolFlavor,
    since_style: SinceStyle,
    count: Option<u64>,
    timeout_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Polling {} ({} flavor)", server, flavor);
    let timeout = Duration::from_millis(timeout_ms);
    let config = ClientConfig::new(server)
        .with_flavor(flavor)
        .with_since_style(since_style)
        .with_poll_interval(Duration::from_millis(poll_interval_ms))
        .with_timeout(timeout);
    let client = ReqwestClient::new(timeout)?;
    let poller = Poller::new(config, client);

    let stats = poller.run(count)?;
    let state = poller.replica().get();
    info!("Finished after {} polls", stats.polls);

    println!("Document: {}", serde_json::to_string(&state.document)?);
    println!("ETag:     {}", state.tag.as_deref().unwrap_or("-"));
    println!("Polls:    {}", stats.polls);
    println!("  Full:      {}", stats.full_responses);
    println!("  Patched:   {}", stats.patches_applied);
    println!("  Unchanged: {}", stats.unchanged);
    println!("Retries:  {}", stats.retries);
    println!("Bytes:    {}", stats.bytes_received);
    Ok(())
}

//! deltasync CLI
//!
//! Runs a delta server or a polling client.
//!
//! # Commands
//!
//! - `serve` - Serve a periodically mutated document
//! - `poll` - Poll a server and keep a local replica current
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use deltasync_client::SinceStyle;
use deltasync_protocol::ProtocolFlavor;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// deltasync delta server and polling client.
#[derive(Parser)]
#[command(name = "deltasync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a periodically mutated document
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Number of past versions kept for patch baselines
        #[arg(long, default_value = "10")]
        max_history: usize,

        /// Milliseconds between mutations
        #[arg(long, default_value = "1000")]
        mutate_interval_ms: u64,

        /// Negotiation flavor (delta, since)
        #[arg(short, long, default_value = "delta")]
        flavor: ProtocolFlavor,
    },

    /// Poll a server and keep a local replica current
    Poll {
        /// Server URL, including the scheme
        #[arg(short, long, default_value = "http://localhost:8080")]
        server: String,

        /// Milliseconds between polls
        #[arg(long, default_value = "1000")]
        poll_interval_ms: u64,

        /// Negotiation flavor (delta, since)
        #[arg(short, long, default_value = "delta")]
        flavor: ProtocolFlavor,

        /// Baseline style for the since flavor (tag, date)
        #[arg(long, default_value = "tag")]
        since_style: SinceStyle,

        /// Stop after this many polls
        #[arg(short, long)]
        count: Option<u64>,

        /// Request timeout in milliseconds
        #[arg(long, default_value = "30000")]
        timeout_ms: u64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = log_filter(cli.verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            bind,
            max_history,
            mutate_interval_ms,
            flavor,
        } => {
            commands::serve::run(bind, max_history, mutate_interval_ms, flavor)?;
        }
        Commands::Poll {
            server,
            poll_interval_ms,
            flavor,
            since_style,
            count,
            timeout_ms,
        } => {
            commands::poll::run(server, poll_interval_ms, flavor, since_style, count, timeout_ms)?;
        }
        Commands::Version => {
            println!("deltasync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// `RUST_LOG` directives when set and valid, else `info` (`debug` with
/// `--verbose`).
fn log_filter(verbose: bool, rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

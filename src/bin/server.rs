//! remotelist Server Binary
//!
//! Starts the TCP server for remotelist.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use remotelist::network::Server;
use remotelist::{Config, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// remotelist Server
#[derive(Parser, Debug)]
#[command(name = "remotelist-server")]
#[command(about = "Network-accessible store of durable integer lists")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./remotelist_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Seconds between background snapshots
    #[arg(short = 's', long, default_value = "30")]
    snapshot_secs: u64,

    /// Idle read timeout per connection in ms (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout per connection in ms (0 = none)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,remotelist=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("remotelist server v{}", remotelist::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .snapshot_interval(Duration::from_secs(args.snapshot_secs))
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    // Open store (loads snapshot, replays log)
    let store = match Store::open(config.clone()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = store.start_snapshots() {
        tracing::error!("Failed to start snapshot scheduler: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        "Store ready: {} lists, snapshot every {}s",
        store.list_count(),
        args.snapshot_secs
    );

    // Start server
    let mut server = Server::new(config, Arc::clone(&store));
    let handle = match server.shutdown_handle() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    // Ctrl+C stops the accept loop; the store is then synced below
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        handle.shutdown();
    }) {
        tracing::warn!("Cannot install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = store.shutdown() {
        tracing::warn!("Error during shutdown: {}", e);
    }
    tracing::info!("Server stopped");
}

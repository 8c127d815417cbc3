//! framewire Server Binary
//!
//! Starts the TCP server.

use clap::Parser;
use framewire::config::DEFAULT_ADDR;
use framewire::protocol::MAX_PAYLOAD_SIZE;
use framewire::{Config, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// framewire Server
#[derive(Parser, Debug)]
#[command(name = "framewire-server")]
#[command(about = "Echo/reverse server speaking the framewire protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = DEFAULT_ADDR)]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Maximum payload size in bytes
    #[arg(short = 'p', long, default_value_t = MAX_PAYLOAD_SIZE)]
    max_payload: u32,

    /// Close connections idle for this many milliseconds (0 = never)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Give up on a blocked write after this many milliseconds (0 = never)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,framewire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();

    let args = Args::parse();

    tracing::info!("framewire server v{}", framewire::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_payload_size(args.max_payload)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let server = match Server::bind(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

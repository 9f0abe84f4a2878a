//! Coincache server - HTTP front end for the read-through market data cache.

mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use coincache_core::config::{NetworkConfig, StorageConfig};
use coincache_core::{CoinGeckoClient, RefreshCoordinator, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "coincache-server")]
#[command(about = "Read-through cache server for coin market data")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Path to the SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Upstream API base URL
    #[arg(long, default_value = NetworkConfig::COINGECKO_API_BASE)]
    api_base: String,

    /// CoinGecko pro API key (falls back to COINGECKO_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting coincache server");

    let db_path = args
        .db
        .unwrap_or_else(|| PathBuf::from(StorageConfig::DEFAULT_DB_FILENAME));
    info!("Store database: {}", db_path.display());

    let api_key = args
        .api_key
        .or_else(|| std::env::var("COINGECKO_API_KEY").ok());

    let store = Arc::new(SqliteStore::new(&db_path)?);
    let fetcher = Arc::new(CoinGeckoClient::with_base_url(&args.api_base, api_key)?);
    let coordinator = Arc::new(RefreshCoordinator::new(fetcher, store));

    // Start the server
    let addr = server::start_server(coordinator, &args.host, args.port).await?;

    // Print port for supervisors/tests to read (intentional stdout)
    println!("HTTP_PORT={}", addr.port());

    info!("Coincache server running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}

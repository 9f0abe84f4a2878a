//! HTTP server implementation using Axum.

use crate::handlers::{handle_coin, handle_health};
use axum::{routing::get, Router};
use coincache_core::RefreshCoordinator;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    /// Refresh coordinator (owns the key locks and freshness tracking)
    pub coordinator: Arc<RefreshCoordinator>,
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(
    coordinator: Arc<RefreshCoordinator>,
    host: &str,
    port: u16,
) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(AppState { coordinator });

    // Browser clients call this directly; allow everything
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/coins", get(handle_coin))
        .layer(cors)
        .with_state(state);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    // Bind to the address
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Server error");
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coincache_core::{CoinGeckoClient, SqliteStore};

    #[tokio::test]
    async fn test_server_starts() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        // Unroutable base URL; nothing in this test fetches
        let fetcher =
            Arc::new(CoinGeckoClient::with_base_url("http://127.0.0.1:1", None).unwrap());
        let coordinator = Arc::new(RefreshCoordinator::new(fetcher, store));

        let addr = start_server(coordinator, "127.0.0.1", 0).await.unwrap();
        assert!(addr.port() > 0);
    }
}

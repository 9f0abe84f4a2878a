//! Integration tests for the coincache HTTP server.
//!
//! These spawn the real binary against a temporary database and an
//! unroutable upstream base URL, so every refresh attempt fails fast and
//! the tests exercise the degraded (cache-only) paths deterministically.

use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncBufReadExt;

/// Upstream base URL that always refuses connections.
const DEAD_UPSTREAM: &str = "http://127.0.0.1:1";

struct ServerHandle {
    child: tokio::process::Child,
    port: u16,
    stdout_drain: Option<tokio::task::JoinHandle<()>>,
}

impl ServerHandle {
    async fn stop(mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.kill().await;
        let _ = self.child.wait().await;
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.start_kill();
    }
}

/// Start the server binary and wait until `/health` is ready.
async fn start_server(db_dir: &std::path::Path) -> Result<ServerHandle, String> {
    let binary = std::env::var("CARGO_BIN_EXE_coincache-server")
        .map(PathBuf::from)
        .map_err(|_| "CARGO_BIN_EXE_coincache-server not set".to_string())?;

    let mut child = tokio::process::Command::new(&binary)
        .arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg("0")
        .arg("--db")
        .arg(db_dir.join("coincache.sqlite"))
        .arg("--api-base")
        .arg(DEAD_UPSTREAM)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to spawn coincache-server: {e}"))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "failed to capture stdout".to_string())?;
    let mut lines = tokio::io::BufReader::new(stdout).lines();

    let mut discovered_port: Option<u16> = None;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    while tokio::time::Instant::now() < deadline {
        match tokio::time::timeout(Duration::from_millis(250), lines.next_line()).await {
            Ok(Ok(Some(line))) => {
                if let Some(value) = line.strip_prefix("HTTP_PORT=") {
                    let parsed = value
                        .trim()
                        .parse::<u16>()
                        .map_err(|e| format!("invalid HTTP_PORT value '{value}': {e}"))?;
                    discovered_port = Some(parsed);
                    break;
                }
            }
            Ok(Ok(None)) => break,
            Ok(Err(err)) => return Err(format!("failed to read server stdout: {err}")),
            Err(_) => continue,
        }
    }

    let port =
        discovered_port.ok_or_else(|| "HTTP_PORT line not emitted by server".to_string())?;
    if !wait_for_server(port, 15).await {
        return Err(format!("server failed health check on port {port}"));
    }

    let stdout_drain =
        tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

    Ok(ServerHandle {
        child,
        port,
        stdout_drain: Some(stdout_drain),
    })
}

async fn check_health(port: u16) -> bool {
    let client = reqwest::Client::new();
    if let Ok(response) = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        if let Ok(json) = response.json::<Value>().await {
            return json.get("status").and_then(|v| v.as_str()) == Some("ok");
        }
    }
    false
}

async fn wait_for_server(port: u16, timeout_secs: u64) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_secs(timeout_secs) {
        if check_health(port).await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let server = start_server(temp_dir.path()).await.unwrap();

    assert!(check_health(server.port).await);

    server.stop().await;
}

#[tokio::test]
async fn test_missing_name_is_bad_request() {
    let temp_dir = TempDir::new().unwrap();
    let server = start_server(temp_dir.path()).await.unwrap();

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/coins", server.port))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("error").and_then(|v| v.as_str()).is_some());

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_coin_with_dead_upstream_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let server = start_server(temp_dir.path()).await.unwrap();

    // Upstream refuses connections and nothing is persisted, so the refresh
    // failure degrades to an empty lookup.
    let client = reqwest::Client::new();
    let response = client
        .get(format!(
            "http://127.0.0.1:{}/coins?name=bitcoin",
            server.port
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap()
        .contains("bitcoin"));

    server.stop().await;
}

#[tokio::test]
async fn test_cors_headers_present() {
    let temp_dir = TempDir::new().unwrap();
    let server = start_server(temp_dir.path()).await.unwrap();

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/health", server.port))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    server.stop().await;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway client for CLI commands

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use mesh_core::{Envelope, EventFilter};
use mesh_gateway::auth::Principal;
use mesh_gateway::lifecycle::{home_hash, socket_dir};
use mesh_gateway::protocol::{self, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tracing::debug;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("MESH_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for the daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("MESH_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for a process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("MESH_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("MESH_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("meshd not running")]
    DaemonNotRunning,

    #[error("Failed to start meshd: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for meshd to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from meshd")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Gateway client
pub struct GatewayClient {
    socket_path: PathBuf,
}

impl GatewayClient {
    /// Connect to the daemon, auto-starting it if not running
    pub async fn connect_or_start(home: &Path) -> Result<Self, ClientError> {
        match Self::connect(home) {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background(home)?;
                Self::connect_with_retry(home, timeout_connect(), child).await
            }
            Err(e) => Err(e),
        }
    }

    /// Connect to an existing daemon (no auto-start)
    pub fn connect(home: &Path) -> Result<Self, ClientError> {
        let socket_path = get_socket_path(home);

        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }

        Ok(Self { socket_path })
    }

    async fn connect_with_retry(
        home: &Path,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // Daemon exiting early means startup failed
            if let Ok(Some(status)) = child.try_wait() {
                return Err(ClientError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            match Self::connect(home) {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    tokio::time::sleep(poll_interval()).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(ClientError::DaemonStartTimeout)
    }

    /// Send a request and receive a single response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        debug!("Sending request: {:?}", request);

        let data = protocol::encode(&request)?;
        tokio::time::timeout(timeout_ipc(), protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(timeout_ipc(), protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        let response: Response = protocol::decode(&response_bytes)?;

        // Gate-level failures are uniform across operations
        match response {
            Response::Forbidden { message } => Err(ClientError::Forbidden(message)),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Ok(other),
        }
    }

    /// Open a streaming subscription
    pub async fn subscribe(
        &self,
        principal: Principal,
        filter: EventFilter,
    ) -> Result<Subscription, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let request = Request::Subscribe { principal, filter };
        let data = protocol::encode(&request)?;
        tokio::time::timeout(timeout_ipc(), protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let first = tokio::time::timeout(timeout_ipc(), protocol::read_message(&mut reader))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        match protocol::decode::<Response>(&first)? {
            Response::Subscribed { subscription_id } => Ok(Subscription {
                subscription_id,
                reader,
                _writer: writer,
            }),
            Response::Forbidden { message } => Err(ClientError::Forbidden(message)),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// A live event stream; dropping it closes the connection, which the
/// gateway notices and unsubscribes
pub struct Subscription {
    pub subscription_id: String,
    reader: OwnedReadHalf,
    // Held open so the server sees a live peer until drop
    _writer: OwnedWriteHalf,
}

impl Subscription {
    /// Next envelope, or `None` when the gateway closes the stream
    pub async fn next(&mut self) -> Result<Option<Envelope>, ClientError> {
        let bytes = match protocol::read_message(&mut self.reader).await {
            Ok(bytes) => bytes,
            Err(ProtocolError::ConnectionClosed) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match protocol::decode::<Response>(&bytes)? {
            Response::Event { envelope } => Ok(Some(envelope)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Start meshd in the background, returning the child process handle
fn start_daemon_background(home: &Path) -> Result<std::process::Child, ClientError> {
    let meshd_path = find_meshd_binary();

    Command::new(&meshd_path)
        .arg(home)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if the daemon was stopped, false if it wasn't running
pub async fn daemon_stop(home: &Path) -> Result<bool, ClientError> {
    let client = match GatewayClient::connect(home) {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            cleanup_stale_pid(home);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let shutdown_result = client.send(Request::Shutdown).await;

    if let Some(pid) = read_daemon_pid(home) {
        if shutdown_result.is_ok() {
            wait_for_exit(pid, timeout_exit()).await;
        }

        // Force kill if still running
        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    cleanup_stale_pid(home);
    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the meshd binary
fn find_meshd_binary() -> PathBuf {
    // Explicit override (used by tests to ensure the right binary)
    if let Ok(path) = std::env::var("MESH_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    // Running from cargo (development)
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let dev_path = PathBuf::from(manifest_dir)
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.join("target/debug/meshd"));
        if let Some(path) = dev_path {
            if path.exists() {
                return path;
            }
        }
    }

    // Sibling of the current executable
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("meshd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    // Fall back to PATH lookup
    PathBuf::from("meshd")
}

/// Get the socket path for a state home
pub fn get_socket_path(home: &Path) -> PathBuf {
    let canonical = home.canonicalize().unwrap_or_else(|_| home.to_path_buf());
    let hash = home_hash(&canonical);
    socket_dir().join(format!("{}.sock", hash))
}

/// Clean up an orphaned PID file
fn cleanup_stale_pid(home: &Path) {
    let pid_path = home.join("meshd.pid");
    if pid_path.exists() {
        let _ = std::fs::remove_file(&pid_path);
    }
}

/// Get the PID from the daemon PID file, if present
pub fn read_daemon_pid(home: &Path) -> Option<u32> {
    let content = std::fs::read_to_string(home.join("meshd.pid")).ok()?;
    content.trim().parse::<u32>().ok()
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // kill -0 checks existence without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

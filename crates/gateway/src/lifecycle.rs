// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use mesh_core::MeshConfig;
use mesh_storage::{FileStore, MemoryStore, SharedStore};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::info;

use crate::gateway::Gateway;
use crate::server::ServerState;

/// Gateway daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// State home directory
    pub home: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to mesh.toml
    pub config_path: PathBuf,
}

impl Config {
    /// Create config for a state home directory
    pub fn for_home(home: &Path) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(home)
            .map_err(|e| LifecycleError::HomeUnavailable(home.to_path_buf(), e))?;
        let canonical = home
            .canonicalize()
            .map_err(|e| LifecycleError::HomeUnavailable(home.to_path_buf(), e))?;

        let hash = home_hash(&canonical);
        let socket_dir = socket_dir();

        Ok(Self {
            home: canonical.clone(),
            socket_path: socket_dir.join(format!("{}.sock", hash)),
            lock_path: canonical.join("meshd.pid"),
            version_path: canonical.join("meshd.version"),
            log_path: canonical.join("meshd.log"),
            config_path: canonical.join("mesh.toml"),
        })
    }
}

/// Gateway daemon state during operation
pub struct GatewayState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Shared handle handed to connection tasks
    pub server: ServerState,
}

impl GatewayState {
    /// Shutdown the gateway gracefully
    pub fn shutdown(&self) {
        info!("Shutting down meshd...");

        for path in [
            &self.config.socket_path,
            &self.config.lock_path,
            &self.config.version_path,
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }

        // Lock file handle is released when self is dropped
        info!("Shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("State home unavailable at {0}: {1}")]
    HomeUnavailable(PathBuf, std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: meshd already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] mesh_core::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] mesh_storage::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the gateway daemon
pub async fn startup(config: &Config) -> Result<GatewayState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<GatewayState, LifecycleError> {
    // 1. Acquire lock file FIRST - prevents races
    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Reborrow as immutable

    // 2. Write version file
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Load mesh config BEFORE binding (fail fast on a bad file)
    let mesh_config = MeshConfig::load(&config.config_path)?;

    // 4. Pick the store backing
    let store: SharedStore = match &mesh_config.store_path {
        Some(path) => {
            let resolved = if path.is_absolute() {
                path.clone()
            } else {
                config.home.join(path)
            };
            info!("Using file-backed store at {}", resolved.display());
            Arc::new(FileStore::open(resolved)?)
        }
        None => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // 5. Build the mesh and gateway (explicit instances, no singletons)
    let gateway = Arc::new(Gateway::new(store, &mesh_config));

    // 6. Remove stale socket and bind (LAST - after all validation)
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("meshd started, state home: {}", config.home.display());

    Ok(GatewayState {
        config: config.clone(),
        lock_file,
        listener,
        server: ServerState::new(gateway),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    for path in [
        &config.socket_path,
        &config.version_path,
        &config.lock_path,
    ] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Default state home: `MESH_HOME`, then `XDG_STATE_HOME/mesh`, then
/// `~/.local/state/mesh`
pub fn default_home() -> Result<PathBuf, LifecycleError> {
    if let Ok(home) = std::env::var("MESH_HOME") {
        return Ok(PathBuf::from(home));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("mesh"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/mesh"))
}

/// Socket directory
///
/// Uses /tmp/mesh by default to keep paths short (macOS SUN_LEN = 104).
/// Can be overridden with MESH_SOCKET_DIR for testing.
pub fn socket_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MESH_SOCKET_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("/tmp/mesh")
}

/// Compute home hash for a unique socket name
pub fn home_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let result = hasher.finalize();
    // Take first 16 chars of hex digest
    result[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event mesh gateway daemon (meshd)
//!
//! Background process that owns the mesh, the correlation engine, and
//! the socket server.

use std::path::PathBuf;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use mesh_gateway::lifecycle::{self, Config, LifecycleError};
use mesh_gateway::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let home = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        lifecycle::default_home()?
    };

    // Load configuration
    let config = Config::for_home(&home)?;

    // Write startup marker to log (before tracing setup, so the CLI
    // can find it)
    write_startup_marker(&config)?;

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!("Starting meshd, state home: {}", home.display());

    // Start gateway
    let state = match lifecycle::startup(&config).await {
        Ok(s) => s,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and
            // may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start meshd: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "meshd ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for parent process (e.g., the CLI waiting on startup)
    println!("READY");

    // Main accept loop; each connection runs on its own task so
    // long-lived subscriptions never block the listener
    loop {
        tokio::select! {
            result = state.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let server_state = state.server.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server::handle_connection(server_state, stream).await {
                                error!("Error handling connection: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }

            // Shutdown requested via IPC
            _ = state.server.shutdown.notified() => {
                info!("Shutdown requested via IPC, shutting down...");
                state.shutdown();
                break;
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                state.shutdown();
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                state.shutdown();
                break;
            }
        }
    }

    info!("meshd stopped");
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// CLI uses this to find where the current startup attempt begins.
/// Full format: "--- meshd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- meshd: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{})", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
/// This ensures the error is visible to the CLI even if the process
/// exits quickly.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start meshd: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

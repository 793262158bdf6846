// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! meshctl - Event mesh control CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{annotate, correlate, daemon, emit, status, tail};
use mesh_gateway::auth::{Principal, Role};
use mesh_gateway::lifecycle;

#[derive(Parser)]
#[command(
    name = "meshctl",
    version,
    about = "Event mesh control - stream, correlate, and annotate telemetry"
)]
struct Cli {
    /// State home directory (default: $MESH_HOME or ~/.local/state/mesh)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Role attached to gated requests
    #[arg(long, global = true, env = "MESH_ROLE", default_value = "viewer")]
    role: Role,

    /// Principal name attached to requests
    #[arg(long, global = true, env = "MESH_USER", default_value = "cli")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream mesh events
    Tail(tail::TailArgs),
    /// Query the correlated timeline for a key
    Correlate(correlate::CorrelateArgs),
    /// Gateway status and telemetry
    Status,
    /// Ingest a producer record (EnvelopeInit JSON)
    Emit(emit::EmitArgs),
    /// Post an annotation to a thread
    Post(annotate::PostArgs),
    /// React to an annotation
    React(annotate::ReactArgs),
    /// Show recent annotations in a thread
    Thread(annotate::ThreadArgs),
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let home = match cli.home {
        Some(home) => home,
        None => lifecycle::default_home()?,
    };
    let principal = Principal::new(cli.user, cli.role);

    match cli.command {
        Commands::Tail(args) => tail::run(args, &home, principal).await,
        Commands::Correlate(args) => correlate::run(args, &home, principal).await,
        Commands::Status => status::run(&home).await,
        Commands::Emit(args) => emit::run(args, &home, principal).await,
        Commands::Post(args) => annotate::post(args, &home, principal).await,
        Commands::React(args) => annotate::react(args, &home, principal).await,
        Commands::Thread(args) => annotate::thread(args, &home, principal).await,
        Commands::Daemon(args) => daemon::run(args, &home).await,
    }
}

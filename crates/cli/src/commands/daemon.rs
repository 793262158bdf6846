// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meshctl daemon` - daemon lifecycle commands

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

use crate::client::{self, ClientError, GatewayClient};
use mesh_gateway::protocol::{Request, Response};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start meshd if it is not already running
    Start,
    /// Stop a running meshd
    Stop,
    /// Check whether meshd is running
    Status,
}

pub async fn run(args: DaemonArgs, home: &Path) -> Result<()> {
    match args.command {
        DaemonCommand::Start => {
            let client = GatewayClient::connect_or_start(home).await?;
            match client.send(Request::Hello {
                version: env!("CARGO_PKG_VERSION").to_string(),
            })
            .await?
            {
                Response::Hello { version } => {
                    println!("meshd running (protocol {})", version);
                }
                _ => return Err(ClientError::UnexpectedResponse.into()),
            }
        }

        DaemonCommand::Stop => {
            if client::daemon_stop(home).await? {
                println!("meshd stopped");
            } else {
                println!("meshd was not running");
            }
        }

        DaemonCommand::Status => match GatewayClient::connect(home) {
            Ok(client) => match client.send(Request::Ping).await {
                Ok(Response::Pong) => {
                    match client::read_daemon_pid(home) {
                        Some(pid) => println!("meshd running (pid {})", pid),
                        None => println!("meshd running"),
                    }
                }
                Ok(_) => return Err(ClientError::UnexpectedResponse.into()),
                Err(e) => return Err(e.into()),
            },
            Err(ClientError::DaemonNotRunning) => println!("meshd not running"),
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meshctl emit` - ingest a producer record

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use crate::client::{ClientError, GatewayClient};
use mesh_core::EnvelopeInit;
use mesh_gateway::auth::Principal;
use mesh_gateway::protocol::{Request, Response};

#[derive(Args)]
pub struct EmitArgs {
    /// EnvelopeInit JSON, inline
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,

    /// Read EnvelopeInit JSON from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub async fn run(args: EmitArgs, home: &Path, principal: Principal) -> Result<()> {
    let content = match (args.json, args.file) {
        (Some(json), _) => json,
        (None, Some(file)) => std::fs::read_to_string(file)?,
        (None, None) => anyhow::bail!("provide --json or --file"),
    };

    let init: EnvelopeInit = serde_json::from_str(&content)?;

    let client = GatewayClient::connect_or_start(home).await?;
    let response = client.send(Request::Ingest { principal, init }).await?;

    match response {
        Response::Ingested { published: true } => println!("Published"),
        Response::Ingested { published: false } => println!("Duplicate (dropped)"),
        _ => return Err(ClientError::UnexpectedResponse.into()),
    }

    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meshctl correlate` - query a correlated timeline

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::client::{ClientError, GatewayClient};
use mesh_core::KeyType;
use mesh_gateway::auth::Principal;
use mesh_gateway::protocol::{Request, Response};

#[derive(Args)]
pub struct CorrelateArgs {
    /// Correlation key value
    #[arg(long)]
    pub key: String,

    /// Correlation key type (traceId|releaseId|assetId|simId)
    #[arg(long = "key-type")]
    pub key_type: KeyType,

    /// Print raw JSON instead of the formatted timeline
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CorrelateArgs, home: &Path, principal: Principal) -> Result<()> {
    let client = GatewayClient::connect_or_start(home).await?;

    let response = client
        .send(Request::Correlate {
            principal,
            key: args.key.clone(),
            key_type: args.key_type,
        })
        .await?;

    let Response::Timeline { timeline } = response else {
        return Err(ClientError::UnexpectedResponse.into());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    println!(
        "Timeline for {} ({}): {} events",
        timeline.key,
        timeline.key_type,
        timeline.timeline.len()
    );
    for envelope in &timeline.timeline {
        let severity = envelope
            .severity
            .map(|s| format!(" [{}]", s))
            .unwrap_or_default();
        println!(
            "  {}  {:<8} {:<7} {}{}",
            envelope.ts.to_rfc3339(),
            envelope.source,
            envelope.kind,
            envelope.service,
            severity
        );
    }

    if !timeline.notes.is_empty() {
        println!("Notes:");
        for note in &timeline.notes {
            println!("  - {}", note);
        }
    }

    Ok(())
}

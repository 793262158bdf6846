// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meshctl tail` - stream mesh events as JSON lines

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::Path;

use crate::client::GatewayClient;
use mesh_core::{EventFilter, Kind, Severity, Source};
use mesh_gateway::auth::Principal;

#[derive(Args)]
pub struct TailArgs {
    /// Only these sources (repeatable)
    #[arg(long = "source")]
    pub sources: Vec<Source>,

    /// Only these services (repeatable)
    #[arg(long = "service")]
    pub services: Vec<String>,

    /// Only these kinds (repeatable)
    #[arg(long = "kind")]
    pub kinds: Vec<Kind>,

    /// Only these severities (repeatable)
    #[arg(long = "severity")]
    pub severities: Vec<Severity>,

    /// Only this trace
    #[arg(long)]
    pub trace: Option<String>,

    /// Only this release
    #[arg(long)]
    pub release: Option<String>,

    /// Only this asset
    #[arg(long)]
    pub asset: Option<String>,

    /// Only this simulation
    #[arg(long)]
    pub sim: Option<String>,

    /// Only events at or after this time (RFC 3339)
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,

    /// Only events at or before this time (RFC 3339)
    #[arg(long)]
    pub until: Option<DateTime<Utc>>,

    /// Stop after printing this many events
    #[arg(long)]
    pub limit: Option<usize>,
}

impl TailArgs {
    fn filter(&self) -> EventFilter {
        EventFilter {
            sources: self.sources.clone(),
            services: self.services.clone(),
            kinds: self.kinds.clone(),
            severities: self.severities.clone(),
            trace_id: self.trace.clone(),
            release_id: self.release.clone(),
            asset_id: self.asset.clone(),
            sim_id: self.sim.clone(),
            since: self.since,
            until: self.until,
        }
    }
}

pub async fn run(args: TailArgs, home: &Path, principal: Principal) -> Result<()> {
    let client = GatewayClient::connect_or_start(home).await?;
    let mut subscription = client.subscribe(principal, args.filter()).await?;

    eprintln!(
        "Subscribed ({}); streaming events, Ctrl-C to stop",
        subscription.subscription_id
    );

    let mut printed = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            next = subscription.next() => {
                match next? {
                    Some(envelope) => {
                        println!("{}", serde_json::to_string(&envelope)?);
                        printed += 1;
                        if args.limit.is_some_and(|limit| printed >= limit) {
                            break;
                        }
                    }
                    None => {
                        eprintln!("Stream closed by gateway");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

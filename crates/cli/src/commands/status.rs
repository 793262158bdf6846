// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meshctl status` - gateway uptime and telemetry summary

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use crate::client::{ClientError, GatewayClient};
use mesh_gateway::protocol::{Request, Response};

pub async fn run(home: &Path) -> Result<()> {
    let client = GatewayClient::connect(home)?;

    let response = client.send(Request::Status).await?;
    let Response::Status {
        uptime_secs,
        subscribers,
        stored_events,
        telemetry,
    } = response
    else {
        return Err(ClientError::UnexpectedResponse.into());
    };

    println!(
        "meshd up {}",
        humantime::format_duration(Duration::from_secs(uptime_secs))
    );
    println!("  Subscribers:      {}", subscribers);
    println!("  Stored events:    {}", stored_events);
    println!(
        "  Ingested:         {}",
        telemetry.ingest.values().sum::<u64>()
    );
    println!(
        "  Dedupe drops:     {}",
        telemetry.dedupe_drops.values().sum::<u64>()
    );
    println!(
        "  Redactions:       {}",
        telemetry.redactions.values().sum::<u64>()
    );
    println!("  Subscriber drops: {}", telemetry.subscriber_drops);

    for (source, lag) in &telemetry.lag_ms {
        println!("  Lag [{}]: {}ms", source, lag);
    }

    Ok(())
}

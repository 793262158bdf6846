// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `meshctl post|react|thread` - annotation channel commands

use anyhow::Result;
use clap::Args;
use std::path::Path;

use crate::client::{ClientError, GatewayClient};
use mesh_gateway::auth::Principal;
use mesh_gateway::protocol::{Request, Response};

#[derive(Args)]
pub struct PostArgs {
    /// Job thread to post into (global thread when omitted)
    #[arg(long)]
    pub job: Option<String>,

    /// Message text
    #[arg(long)]
    pub text: String,

    /// Attachment names (repeatable)
    #[arg(long = "attach")]
    pub attachments: Vec<String>,
}

#[derive(Args)]
pub struct ReactArgs {
    /// Message id
    #[arg(long)]
    pub id: String,

    /// Reaction emoji or shortcode
    #[arg(long)]
    pub emoji: String,
}

#[derive(Args)]
pub struct ThreadArgs {
    /// Job thread to read (global thread when omitted)
    #[arg(long)]
    pub job: Option<String>,

    /// Only the most recent N messages
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn post(args: PostArgs, home: &Path, principal: Principal) -> Result<()> {
    let client = GatewayClient::connect_or_start(home).await?;

    let response = client
        .send(Request::Annotate {
            principal,
            job_id: args.job,
            text: args.text,
            attachments: args.attachments,
        })
        .await?;

    let Response::Posted { message } = response else {
        return Err(ClientError::UnexpectedResponse.into());
    };

    println!("Posted {} at {}", message.id, message.ts.to_rfc3339());
    if !message.redactions.is_empty() {
        println!("  Redacted: {}", message.redactions.join(", "));
    }
    Ok(())
}

pub async fn react(args: ReactArgs, home: &Path, principal: Principal) -> Result<()> {
    let client = GatewayClient::connect_or_start(home).await?;

    let response = client
        .send(Request::React {
            principal,
            message_id: args.id,
            emoji: args.emoji,
        })
        .await?;

    let Response::Reacted { reactions } = response else {
        return Err(ClientError::UnexpectedResponse.into());
    };

    let summary: Vec<String> = reactions
        .iter()
        .map(|(emoji, count)| format!("{} x{}", emoji, count))
        .collect();
    println!("Reactions: {}", summary.join(", "));
    Ok(())
}

pub async fn thread(args: ThreadArgs, home: &Path, principal: Principal) -> Result<()> {
    let client = GatewayClient::connect_or_start(home).await?;

    let response = client
        .send(Request::Thread {
            principal,
            job_id: args.job,
            limit: args.limit,
        })
        .await?;

    let Response::Messages { messages } = response else {
        return Err(ClientError::UnexpectedResponse.into());
    };

    if messages.is_empty() {
        println!("No messages");
        return Ok(());
    }

    for message in messages {
        println!(
            "[{}] {} ({}): {}",
            message.ts.to_rfc3339(),
            message.author,
            message.role,
            message.text
        );
        if !message.reactions.is_empty() {
            let summary: Vec<String> = message
                .reactions
                .iter()
                .map(|(emoji, count)| format!("{} x{}", emoji, count))
                .collect();
            println!("    {}", summary.join(", "));
        }
    }
    Ok(())
}

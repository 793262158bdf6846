// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol: length-prefixed JSON frames over the Unix socket
//!
//! Every frame is a 4-byte big-endian length followed by one JSON
//! document. Request/response pairs share a connection; a `Subscribe`
//! request upgrades its connection to a server-push stream of `Event`
//! frames.

use crate::annotations::Annotation;
use crate::auth::Principal;
use mesh_core::{Envelope, EnvelopeInit, EventFilter, KeyType, TelemetrySnapshot};
use mesh_engine::CorrelatedTimeline;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Protocol version exchanged in the Hello handshake
pub const PROTOCOL_VERSION: &str = "1";

/// Timeout for request/response frames (not for streamed events)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Frames larger than this are treated as corrupt
pub const MAX_FRAME_BYTES: u32 = 8 * 1024 * 1024;

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Frame too large: {0} bytes")]
    FrameTooLarge(u32),
}

/// Client-to-gateway requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Hello {
        version: String,
    },
    Ping,
    Status,
    Ingest {
        principal: Principal,
        init: EnvelopeInit,
    },
    Correlate {
        principal: Principal,
        key: String,
        key_type: KeyType,
    },
    Subscribe {
        principal: Principal,
        #[serde(default)]
        filter: EventFilter,
    },
    Annotate {
        principal: Principal,
        job_id: Option<String>,
        text: String,
        #[serde(default)]
        attachments: Vec<String>,
    },
    React {
        principal: Principal,
        message_id: String,
        emoji: String,
    },
    Thread {
        principal: Principal,
        job_id: Option<String>,
        limit: Option<usize>,
    },
    Shutdown,
}

/// Gateway-to-client responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Hello {
        version: String,
    },
    Pong,
    Status {
        uptime_secs: u64,
        subscribers: usize,
        stored_events: usize,
        telemetry: TelemetrySnapshot,
    },
    Ingested {
        published: bool,
    },
    Timeline {
        timeline: CorrelatedTimeline,
    },
    Subscribed {
        subscription_id: String,
    },
    /// One streamed envelope on a subscription connection
    Event {
        envelope: Envelope,
    },
    Posted {
        message: Annotation,
    },
    Reacted {
        reactions: BTreeMap<String, u32>,
    },
    Messages {
        messages: Vec<Annotation>,
    },
    ShuttingDown,
    Forbidden {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Encode a value as a JSON frame body (no length prefix)
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode a JSON frame body
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write one frame: 4-byte big-endian length, then the body
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame body
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    if let Err(e) = reader.read_exact(&mut len_buf).await {
        return Err(closed_or_io(e));
    }

    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge(len));
    }

    let mut buf = vec![0u8; len as usize];
    if let Err(e) = reader.read_exact(&mut buf).await {
        return Err(closed_or_io(e));
    }
    Ok(buf)
}

fn closed_or_io(error: io::Error) -> ProtocolError {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        ProtocolError::ConnectionClosed
    } else {
        ProtocolError::Io(error)
    }
}

/// Read a request frame with a timeout
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Write a response frame with a timeout
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

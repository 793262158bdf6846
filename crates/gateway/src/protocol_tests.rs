// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use crate::auth::Role;
use mesh_core::{Kind, Source};

fn operator() -> Principal {
    Principal::new("sam", Role::Operator)
}

#[test]
fn encode_decode_roundtrip_request() {
    let request = Request::Correlate {
        principal: operator(),
        key: "rel-1".to_string(),
        key_type: KeyType::ReleaseId,
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_subscribe_with_filter() {
    let request = Request::Subscribe {
        principal: operator(),
        filter: EventFilter {
            sources: vec![Source::Media],
            kinds: vec![Kind::Job],
            asset_id: Some("asset-1".to_string()),
            ..Default::default()
        },
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_response() {
    let response = Response::Status {
        uptime_secs: 3600,
        subscribers: 2,
        stored_events: 128,
        telemetry: TelemetrySnapshot::default(),
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn ingest_request_carries_a_full_init() {
    let request = Request::Ingest {
        principal: operator(),
        init: EnvelopeInit::new("2026-02-01T10:00:00Z", Source::Otel, "checkout", Kind::Span)
            .with_trace("t-1"),
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = Response::Pong;
    let encoded = encode(&response).expect("encode failed");

    // encode() returns raw JSON, no length prefix
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(
        json_str.starts_with('{'),
        "should be JSON object: {}",
        json_str
    );
}

#[test]
fn requests_are_tagged_by_type() {
    let encoded = encode(&Request::Ping).expect("encode failed");
    let value: serde_json::Value = serde_json::from_slice(&encoded).expect("valid json");
    assert_eq!(value["type"], "ping");
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original)
        .await
        .expect("write failed");

    // write_message adds 4-byte length prefix
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data)
        .await
        .expect("write failed");

    // First 4 bytes are the length prefix
    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;

    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn eof_reads_as_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());

    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn oversized_frame_is_rejected() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(MAX_FRAME_BYTES + 1).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buffer);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::FrameTooLarge(_))
    ));
}

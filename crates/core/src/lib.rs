// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mesh-core: Core library for the event mesh
//!
//! This crate provides:
//! - The canonical envelope codec and attribute value model
//! - Redaction, idempotency tracking, and subscription filtering
//! - The in-process event bus and ingest telemetry

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod value;

pub mod bus;
pub mod config;
pub mod dedupe;
pub mod envelope;
pub mod filter;
pub mod redact;
pub mod telemetry;

// Re-exports
pub use bus::{Delivery, EnvelopeReceiver, EventBus, SubscriberId, DEFAULT_SUBSCRIBER_CAPACITY};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, MeshConfig};
pub use dedupe::{DedupeTracker, DEFAULT_DEDUPE_TTL};
pub use envelope::{
    Envelope, EnvelopeInit, KeyType, Kind, Severity, Source, TimestampInit, ValidationError,
    SCHEMA_VERSION,
};
pub use filter::EventFilter;
pub use redact::{Redactor, REDACTION_MARKER};
pub use telemetry::{TelemetryRecorder, TelemetrySnapshot};
pub use value::{attr_map, AttrMap, AttrValue};

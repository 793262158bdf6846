// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mesh-engine: Correlation engine and ingest pipeline
//!
//! This crate provides:
//! - The `EventMesh` ingestion pipeline (normalize → redact → dedupe →
//!   telemetry → store → bus)
//! - The `CorrelationEngine` answering "what happened around this key"
//! - The pluggable join rules that turn a timeline into inferences

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod correlate;
pub mod mesh;
pub mod rules;

// Re-exports
pub use correlate::{CorrelatedTimeline, CorrelationEngine};
pub use mesh::{EventMesh, Ingest, MeshError};
pub use rules::{
    default_rules, CaptionLatencyRule, JoinRule, ReleaseIncidentRule, SimEvidenceRule,
};

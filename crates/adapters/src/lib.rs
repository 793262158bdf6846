// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mesh-adapters: Producer-boundary mappers
//!
//! Each adapter maps one producer's native record shape into an
//! `EnvelopeInit` for the ingest pipeline. Adapters do nothing else:
//! no validation (the codec owns that), no redaction, no IO.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod audit;
pub mod economy;
pub mod media;
pub mod otel;
pub mod prom;

pub use audit::AuditRecord;
pub use economy::SimulationEvent;
pub use media::CaptionJob;
pub use otel::{OtelLogRecord, OtelSpan};
pub use prom::PromSample;

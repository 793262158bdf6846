// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingest telemetry counters and gauges
//!
//! Recording is side-effect only and infallible; telemetry must never
//! block or fail ingestion, so nothing here returns a `Result`.

use crate::clock::{Clock, SystemClock};
use crate::envelope::Envelope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Serializable view of the recorder's counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Ingested envelopes keyed by `source/kind`
    pub ingest: BTreeMap<String, u64>,
    /// Duplicate drops keyed by `source/kind`
    pub dedupe_drops: BTreeMap<String, u64>,
    /// Redactions applied keyed by field path
    pub redactions: BTreeMap<String, u64>,
    /// Latest ingest lag in milliseconds keyed by source
    pub lag_ms: BTreeMap<String, u64>,
    /// Envelopes dropped on full subscriber queues
    pub subscriber_drops: u64,
}

pub struct TelemetryRecorder<C: Clock = SystemClock> {
    clock: C,
    inner: Mutex<TelemetrySnapshot>,
}

impl TelemetryRecorder<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> TelemetryRecorder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            inner: Mutex::new(TelemetrySnapshot::default()),
        }
    }

    /// Count an accepted envelope and update the source's lag gauge
    pub fn record_ingest(&self, envelope: &Envelope) {
        let lag_ms = self
            .clock
            .now_utc()
            .signed_duration_since(envelope.ts)
            .num_milliseconds()
            .max(0) as u64;

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *inner.ingest.entry(source_kind(envelope)).or_insert(0) += 1;
        inner
            .lag_ms
            .insert(envelope.source.as_str().to_string(), lag_ms);
    }

    /// Count a duplicate dropped by the idempotency tracker
    pub fn record_dedupe(&self, envelope: &Envelope) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *inner.dedupe_drops.entry(source_kind(envelope)).or_insert(0) += 1;
    }

    /// Count a redaction applied to the given field path
    pub fn record_redaction(&self, field: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *inner.redactions.entry(field.to_string()).or_insert(0) += 1;
    }

    /// Count envelopes dropped on full subscriber queues
    pub fn record_subscriber_drops(&self, count: usize) {
        if count == 0 {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscriber_drops += count as u64;
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for TelemetryRecorder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

fn source_kind(envelope: &Envelope) -> String {
    format!("{}/{}", envelope.source, envelope.kind)
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event mesh ingest pipeline
//!
//! One explicit instance per process, owned by the entry point and
//! handed to the gateway by reference; there are no module-level
//! singletons, so tests instantiate isolated meshes freely.
//!
//! Ingest order: normalize → redact → dedupe gate → telemetry → store
//! append → bus publish. The store is fed on the ingest path so
//! queries observe every accepted envelope deterministically;
//! subscriber fan-out stays deferred through per-subscriber channels.

use mesh_core::{
    Clock, DedupeTracker, Envelope, EnvelopeInit, EnvelopeReceiver, EventBus, EventFilter,
    MeshConfig, Redactor, SubscriberId, SystemClock, TelemetryRecorder, TelemetrySnapshot,
    ValidationError,
};
use mesh_storage::{CorrelationStore, StoreError};
use thiserror::Error;
use tracing::debug;

/// Outcome of one ingest call
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest {
    /// Accepted, stored, and fanned out
    Published(Envelope),
    /// Dropped by the dedupe window; a no-op, not a failure
    Duplicate,
}

impl Ingest {
    pub fn is_published(&self) -> bool {
        matches!(self, Ingest::Published(_))
    }
}

/// Errors surfaced to producers by [`EventMesh::ingest`]
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub struct EventMesh<S, C: Clock = SystemClock> {
    redactor: Redactor,
    dedupe: DedupeTracker<C>,
    telemetry: TelemetryRecorder<C>,
    bus: EventBus,
    store: S,
}

impl<S: CorrelationStore> EventMesh<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, &MeshConfig::default())
    }

    pub fn with_config(store: S, config: &MeshConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<S: CorrelationStore, C: Clock> EventMesh<S, C> {
    pub fn with_clock(store: S, config: &MeshConfig, clock: C) -> Self {
        Self {
            redactor: Redactor::with_terms(config.redact_terms.iter().cloned()),
            dedupe: DedupeTracker::with_clock(config.dedupe_ttl, clock.clone()),
            telemetry: TelemetryRecorder::with_clock(clock),
            bus: EventBus::with_capacity(config.subscriber_capacity),
            store,
        }
    }

    /// Ingest one producer record
    ///
    /// Validation failures reach the producer untouched and nothing is
    /// ingested. A duplicate returns `Ok(Ingest::Duplicate)`: callers
    /// must not treat it as an error.
    pub fn ingest(&self, init: EnvelopeInit) -> Result<Ingest, MeshError> {
        let envelope = init.normalize()?;

        let (envelope, masked) = self.redactor.redact_report(&envelope);
        for field in &masked {
            self.telemetry.record_redaction(field);
        }

        if !self.dedupe.register(&envelope) {
            self.telemetry.record_dedupe(&envelope);
            debug!(service = %envelope.service, "duplicate envelope dropped");
            return Ok(Ingest::Duplicate);
        }

        self.telemetry.record_ingest(&envelope);
        self.store.append(&envelope)?;

        let delivery = self.bus.publish(&envelope);
        self.telemetry.record_subscriber_drops(delivery.dropped);

        Ok(Ingest::Published(envelope))
    }

    /// Live subscription; sees only envelopes published after it
    /// attaches
    pub fn subscribe(&self, filter: EventFilter) -> (SubscriberId, EnvelopeReceiver) {
        self.bus.subscribe(filter)
    }

    /// Idempotent
    pub fn unsubscribe(&self, id: &SubscriberId) {
        self.bus.unsubscribe(id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;

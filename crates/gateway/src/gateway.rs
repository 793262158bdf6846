// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway operation layer
//!
//! Every operation authorizes first: a failed scope check returns
//! before any engine, store, or thread state is touched.

use crate::annotations::{Annotation, AnnotationLog};
use crate::auth::{authorize, ForbiddenError, Principal, Scope};
use mesh_core::{
    EnvelopeInit, EnvelopeReceiver, EventFilter, KeyType, MeshConfig, Redactor, SubscriberId,
    TelemetrySnapshot,
};
use mesh_engine::{CorrelatedTimeline, CorrelationEngine, EventMesh, Ingest, MeshError};
use mesh_storage::{SharedStore, StoreError};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Forbidden(#[from] ForbiddenError),

    #[error("{0}")]
    Ingest(#[from] MeshError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("unknown annotation: {0}")]
    UnknownAnnotation(String),
}

/// One gateway over one mesh; constructed by the process entry point
/// and shared across connection tasks
pub struct Gateway {
    mesh: EventMesh<SharedStore>,
    engine: CorrelationEngine<SharedStore>,
    annotations: AnnotationLog,
}

impl Gateway {
    pub fn new(store: SharedStore, config: &MeshConfig) -> Self {
        Self {
            mesh: EventMesh::with_config(store.clone(), config),
            engine: CorrelationEngine::new(store),
            annotations: AnnotationLog::new(Redactor::with_terms(
                config.redact_terms.iter().cloned(),
            )),
        }
    }

    /// `correlate:read`: full timeline plus join-rule notes for a key
    pub fn correlate(
        &self,
        principal: &Principal,
        key: &str,
        key_type: KeyType,
    ) -> Result<CorrelatedTimeline, GatewayError> {
        authorize(principal, Scope::CorrelateRead)?;
        Ok(self.engine.correlate(key, key_type)?)
    }

    /// `events:read`: live subscription; replays nothing retroactively
    pub fn subscribe(
        &self,
        principal: &Principal,
        filter: EventFilter,
    ) -> Result<(SubscriberId, EnvelopeReceiver), GatewayError> {
        authorize(principal, Scope::EventsRead)?;
        Ok(self.mesh.subscribe(filter))
    }

    /// Idempotent
    pub fn unsubscribe(&self, id: &SubscriberId) {
        self.mesh.unsubscribe(id);
    }

    /// `ingest:write`: feed one producer record through the pipeline
    pub fn ingest(
        &self,
        principal: &Principal,
        init: EnvelopeInit,
    ) -> Result<Ingest, GatewayError> {
        authorize(principal, Scope::IngestWrite)?;
        Ok(self.mesh.ingest(init)?)
    }

    /// `annotate:write`: post to a thread and mirror onto the mesh
    pub fn annotate(
        &self,
        principal: &Principal,
        job_id: Option<String>,
        text: String,
        attachments: Vec<String>,
    ) -> Result<Annotation, GatewayError> {
        authorize(principal, Scope::AnnotateWrite)?;

        let message = self.annotations.post(principal, job_id, text, attachments);

        // Mirror failure must not fail the post; the thread already
        // accepted the message
        if let Err(e) = self.mesh.ingest(message.to_envelope_init()) {
            warn!(message_id = %message.id, error = %e, "failed to mirror annotation onto the mesh");
        }

        Ok(message)
    }

    /// `annotate:write`: bump a reaction count
    pub fn react(
        &self,
        principal: &Principal,
        message_id: &str,
        emoji: &str,
    ) -> Result<BTreeMap<String, u32>, GatewayError> {
        authorize(principal, Scope::AnnotateWrite)?;
        self.annotations
            .react(message_id, emoji)
            .ok_or_else(|| GatewayError::UnknownAnnotation(message_id.to_string()))
    }

    /// `events:read`: hydrate recent thread history
    pub fn thread(
        &self,
        principal: &Principal,
        job_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Annotation>, GatewayError> {
        authorize(principal, Scope::EventsRead)?;
        Ok(self.annotations.thread(job_id, limit))
    }

    pub fn subscriber_count(&self) -> usize {
        self.mesh.subscriber_count()
    }

    pub fn stored_events(&self) -> Result<usize, GatewayError> {
        use mesh_storage::CorrelationStore;
        Ok(self.mesh.store().len()?)
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.mesh.telemetry()
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correlation queries over the store
//!
//! The engine fetches every envelope sharing a key, sorts ascending by
//! event time (stable, so ties keep insertion order), then runs the
//! registered join rules in registration order. Notes are derived per
//! query and never stored.

use crate::rules::{default_rules, JoinRule};
use mesh_core::{Envelope, KeyType};
use mesh_storage::{CorrelationStore, StoreError};
use serde::{Deserialize, Serialize};

/// Result of a correlation query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelatedTimeline {
    pub key: String,
    pub key_type: KeyType,
    /// Matching envelopes, ascending by `ts`
    pub timeline: Vec<Envelope>,
    /// Join-rule inferences, in rule registration order
    pub notes: Vec<String>,
}

pub struct CorrelationEngine<S> {
    store: S,
    rules: Vec<Box<dyn JoinRule>>,
}

impl<S: CorrelationStore> CorrelationEngine<S> {
    /// Engine with the reference rule set
    pub fn new(store: S) -> Self {
        Self::with_rules(store, default_rules())
    }

    pub fn with_rules(store: S, rules: Vec<Box<dyn JoinRule>>) -> Self {
        Self { store, rules }
    }

    /// Append a custom rule; runs after all previously registered rules
    pub fn register_rule(&mut self, rule: Box<dyn JoinRule>) {
        self.rules.push(rule);
    }

    /// Retain an envelope for later correlation
    pub fn ingest(&self, envelope: &Envelope) -> Result<(), StoreError> {
        self.store.append(envelope)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Everything that happened around `key`, plus rule inferences
    pub fn correlate(&self, key: &str, key_type: KeyType) -> Result<CorrelatedTimeline, StoreError> {
        let mut timeline = self.store.find_by_key(key, key_type)?;
        timeline.sort_by_key(|e| e.ts);

        let mut notes = Vec::new();
        for rule in &self.rules {
            notes.extend(rule.notes(&timeline, key, key_type));
        }

        Ok(CorrelatedTimeline {
            key: key.to_string(),
            key_type,
            timeline,
            notes,
        })
    }
}

#[cfg(test)]
#[path = "correlate_tests.rs"]
mod tests;

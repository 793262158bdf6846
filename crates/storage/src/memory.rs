// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Volatile in-memory correlation store

use crate::{CorrelationStore, StoreError};
use mesh_core::{Envelope, KeyType};
use std::sync::{Arc, RwLock};

/// In-memory store with process lifetime; clones share the same
/// underlying sequence
#[derive(Clone, Default)]
pub struct MemoryStore {
    events: Arc<RwLock<Vec<Envelope>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CorrelationStore for MemoryStore {
    fn append(&self, envelope: &Envelope) -> Result<(), StoreError> {
        let mut events = self.events.write().unwrap_or_else(|e| e.into_inner());
        events.push(envelope.clone());
        Ok(())
    }

    fn find_by_key(&self, key: &str, key_type: KeyType) -> Result<Vec<Envelope>, StoreError> {
        let events = self.events.read().unwrap_or_else(|e| e.into_inner());
        Ok(events
            .iter()
            .filter(|e| e.correlation_key(key_type) == Some(key))
            .cloned()
            .collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.events.read().unwrap_or_else(|e| e.into_inner()).len())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mesh-storage: Correlation store implementations
//!
//! Envelopes are retained in an append-only sequence, logically indexed
//! by the correlation-key fields. Lookup is an equality match against
//! the requested field; dedupe and eviction are explicitly not this
//! crate's job.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod file;
pub mod memory;

use mesh_core::{Envelope, KeyType};
use std::sync::Arc;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors from store IO; the reference design has no retry layer, so
/// callers needing resilience wrap these themselves
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only retention of envelopes, queryable by correlation key
pub trait CorrelationStore: Send + Sync {
    /// Append an envelope; never deduplicates
    fn append(&self, envelope: &Envelope) -> Result<(), StoreError>;

    /// All envelopes whose `key_type` field equals `key`, in insertion
    /// order. Equality only, no prefix or fuzzy matching.
    fn find_by_key(&self, key: &str, key_type: KeyType) -> Result<Vec<Envelope>, StoreError>;

    /// Total retained envelopes
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Shared handle to a store chosen at runtime
pub type SharedStore = Arc<dyn CorrelationStore>;

impl<T: CorrelationStore + ?Sized> CorrelationStore for Arc<T> {
    fn append(&self, envelope: &Envelope) -> Result<(), StoreError> {
        (**self).append(envelope)
    }

    fn find_by_key(&self, key: &str, key_type: KeyType) -> Result<Vec<Envelope>, StoreError> {
        (**self).find_by_key(key, key_type)
    }

    fn len(&self) -> Result<usize, StoreError> {
        (**self).len()
    }
}

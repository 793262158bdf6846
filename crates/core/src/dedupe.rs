// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-windowed idempotency tracking
//!
//! Producers deliver at-least-once; the tracker collapses redeliveries
//! inside a sliding TTL window. Entries are pruned lazily on each
//! registration call, so the map never holds keys older than one
//! window. Key cardinality within a window is unbounded.

use crate::clock::{Clock, SystemClock};
use crate::envelope::Envelope;
use crate::value::AttrValue;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default dedupe window
pub const DEFAULT_DEDUPE_TTL: Duration = Duration::from_secs(5 * 60);

/// Tracks first-seen times per derived envelope identity
pub struct DedupeTracker<C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    seen: Mutex<HashMap<String, Instant>>,
}

impl DedupeTracker<SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> DedupeTracker<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` when the envelope is first-seen within the TTL
    /// window, `false` when it is a duplicate to drop.
    ///
    /// The window slides: a duplicate arriving just before expiry still
    /// drops, and the next occurrence of the same key after expiry is
    /// treated as new.
    pub fn register(&self, envelope: &Envelope) -> bool {
        let now = self.clock.now();
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());

        seen.retain(|_, first_seen| now.saturating_duration_since(*first_seen) < self.ttl);

        let key = derived_key(envelope);
        if seen.contains_key(&key) {
            return false;
        }
        seen.insert(key, now);
        true
    }

    /// Number of identities currently inside the window
    pub fn tracked(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Identity hash for redelivery detection
///
/// The disambiguator prefers `trace_id`, then `span_id`, then an
/// attribute-level `id`.
pub fn derived_key(envelope: &Envelope) -> String {
    let disambiguator = envelope
        .trace_id
        .as_deref()
        .or(envelope.span_id.as_deref())
        .or_else(|| envelope.attrs.get("id").and_then(AttrValue::as_str))
        .unwrap_or("");

    let ts = envelope.ts.to_rfc3339();
    let mut hasher = Sha256::new();
    for part in [
        envelope.source.as_str(),
        envelope.service.as_str(),
        envelope.kind.as_str(),
        ts.as_str(),
        disambiguator,
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }

    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "dedupe_tests.rs"]
mod tests;

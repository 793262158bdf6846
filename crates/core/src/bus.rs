// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for fanning envelopes out to subscribers
//!
//! Each subscriber owns a bounded channel; `publish` clones the
//! envelope per matching subscriber and enqueues without blocking, so
//! delivery happens on the subscriber's task, never inside the
//! publisher's call frame. A full queue drops the envelope for that
//! subscriber only (drop-newest), bounding memory under a slow
//! consumer.

use crate::envelope::Envelope;
use crate::filter::EventFilter;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Default per-subscriber queue depth
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 1024;

/// Subscriber handle for unsubscribing
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub String);

/// Sender for envelope delivery
pub type EnvelopeSender = mpsc::Sender<Envelope>;
/// Receiver for envelope delivery
pub type EnvelopeReceiver = mpsc::Receiver<Envelope>;

/// Per-publish delivery accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Envelopes enqueued to subscriber channels
    pub delivered: usize,
    /// Envelopes dropped because a subscriber queue was full
    pub dropped: usize,
}

/// The event bus routes envelopes to matching subscribers
pub struct EventBus {
    capacity: usize,
    subscribers: Arc<RwLock<HashMap<SubscriberId, (EventFilter, EnvelopeSender)>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe with a filter; returns the subscription id and the
    /// receiving end of the subscriber's queue
    pub fn subscribe(&self, filter: EventFilter) -> (SubscriberId, EnvelopeReceiver) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = SubscriberId(uuid::Uuid::new_v4().to_string());

        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.insert(id.clone(), (filter, tx));

        (id, rx)
    }

    /// Unsubscribe; idempotent, unknown ids are a no-op
    pub fn unsubscribe(&self, id: &SubscriberId) {
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.remove(id);
    }

    /// Publish an envelope to all matching subscribers
    ///
    /// Each subscriber receives an independent clone, so one
    /// subscriber's mutation cannot leak to another. Subscribers whose
    /// receiver is gone are removed.
    pub fn publish(&self, envelope: &Envelope) -> Delivery {
        let mut delivery = Delivery::default();
        let mut closed = Vec::new();

        {
            let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
            for (id, (filter, tx)) in subs.iter() {
                if !filter.matches(envelope) {
                    continue;
                }
                match tx.try_send(envelope.clone()) {
                    Ok(()) => delivery.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        debug!(subscriber = %id.0, "subscriber queue full, dropping envelope");
                        delivery.dropped += 1;
                    }
                    Err(TrySendError::Closed(_)) => closed.push(id.clone()),
                }
            }
        }

        if !closed.is_empty() {
            let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            for id in closed {
                subs.remove(&id);
            }
        }

        delivery
    }

    /// Count of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope filtering for subscriptions
//!
//! All present predicates must hold (logical AND). Empty vectors and
//! unset fields match everything, so the default filter matches all.

use crate::envelope::{Envelope, Kind, Severity, Source};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilter {
    pub sources: Vec<Source>,
    pub services: Vec<String>,
    pub kinds: Vec<Kind>,
    pub severities: Vec<Severity>,
    pub trace_id: Option<String>,
    pub release_id: Option<String>,
    pub asset_id: Option<String>,
    pub sim_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl EventFilter {
    /// Filter that matches every envelope
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn matches(&self, envelope: &Envelope) -> bool {
        if !self.sources.is_empty() && !self.sources.contains(&envelope.source) {
            return false;
        }
        if !self.services.is_empty() && !self.services.contains(&envelope.service) {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&envelope.kind) {
            return false;
        }
        if !self.severities.is_empty() {
            match envelope.severity {
                Some(severity) if self.severities.contains(&severity) => {}
                _ => return false,
            }
        }
        if let Some(id) = &self.trace_id {
            if envelope.trace_id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(id) = &self.release_id {
            if envelope.release_id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(id) = &self.asset_id {
            if envelope.asset_id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(id) = &self.sim_id {
            if envelope.sim_id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if envelope.ts < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if envelope.ts > until {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

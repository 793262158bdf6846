// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation evidence rule
//!
//! Active for `simId` and `releaseId` timelines. Collects the distinct
//! evidence hashes attached to matching events into a single note.

use super::JoinRule;
use mesh_core::{AttrValue, Envelope, KeyType};
use std::collections::BTreeSet;

pub struct SimEvidenceRule;

impl JoinRule for SimEvidenceRule {
    fn name(&self) -> &'static str {
        "sim-evidence"
    }

    fn notes(&self, timeline: &[Envelope], _key: &str, key_type: KeyType) -> Vec<String> {
        if !matches!(key_type, KeyType::SimId | KeyType::ReleaseId) {
            return Vec::new();
        }

        let hashes: BTreeSet<&str> = timeline
            .iter()
            .filter_map(|e| e.attrs.get("evidenceHash").and_then(AttrValue::as_str))
            .collect();

        if hashes.is_empty() {
            return Vec::new();
        }

        let listed: Vec<&str> = hashes.into_iter().collect();
        vec![format!("Evidence recorded: {}", listed.join(", "))]
    }
}

#[cfg(test)]
#[path = "sim_evidence_tests.rs"]
mod tests;

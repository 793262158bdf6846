// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release/incident alignment rule
//!
//! Active for `releaseId` timelines only. Flags a `deploy.create`
//! audit action landing in the same window as gateway traffic on an
//! incidents route.

use super::JoinRule;
use mesh_core::{AttrValue, Envelope, KeyType, Kind, Source};

pub struct ReleaseIncidentRule;

impl JoinRule for ReleaseIncidentRule {
    fn name(&self) -> &'static str {
        "release-incident"
    }

    fn notes(&self, timeline: &[Envelope], key: &str, key_type: KeyType) -> Vec<String> {
        if key_type != KeyType::ReleaseId {
            return Vec::new();
        }

        let deploy = timeline.iter().any(|e| {
            e.kind == Kind::Audit
                && e.attrs.get("action").and_then(AttrValue::as_str) == Some("deploy.create")
        });

        let incident = timeline.iter().any(|e| {
            e.source == Source::Gateway
                && e.kind == Kind::Log
                && e.attrs
                    .get("route")
                    .and_then(AttrValue::as_str)
                    .is_some_and(|route| route.starts_with("/incidents"))
        });

        match (deploy, incident) {
            (true, true) => vec![format!(
                "Release {} aligns with an incident window; review error rates.",
                key
            )],
            (true, false) => vec![format!(
                "Release {} deployed with no incident activity in its window.",
                key
            )],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "release_incident_tests.rs"]
mod tests;

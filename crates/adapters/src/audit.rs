// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit adapter: control-plane action records

use mesh_core::{AttrMap, EnvelopeInit, Kind, Source};
use serde::{Deserialize, Serialize};

/// One control-plane action, e.g. `deploy.create` or `deploy.promote`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Dotted action name
    pub action: String,
    pub actor: String,
    pub service: String,
    /// ISO-8601 action time
    pub ts: String,
    #[serde(default)]
    pub release_id: Option<String>,
    #[serde(default)]
    pub details: AttrMap,
}

impl AuditRecord {
    pub fn into_init(self) -> EnvelopeInit {
        let mut init = EnvelopeInit::new(self.ts.as_str(), Source::Audit, self.service, Kind::Audit)
            .with_attr("action", self.action)
            .with_attr("actor", self.actor);

        if let Some(release_id) = self.release_id {
            init = init.with_release(release_id);
        }
        init.attrs.extend(self.details);
        init
    }
}

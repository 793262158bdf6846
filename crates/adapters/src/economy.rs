// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Economy adapter: simulation lifecycle events

use mesh_core::{EnvelopeInit, Kind, Source};
use serde::{Deserialize, Serialize};

/// One simulation lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationEvent {
    pub sim_id: String,
    pub service: String,
    /// `created`, `running`, `completed`, `failed`
    pub phase: String,
    /// ISO-8601 event time
    pub ts: String,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub evidence_hash: Option<String>,
    #[serde(default)]
    pub release_id: Option<String>,
}

impl SimulationEvent {
    pub fn into_init(self) -> EnvelopeInit {
        let mut init = EnvelopeInit::new(self.ts.as_str(), Source::Economy, self.service, Kind::Job)
            .with_sim(self.sim_id)
            .with_attr("phase", self.phase);

        if let Some(seed) = self.seed {
            init = init.with_attr("seed", seed);
        }
        if let Some(hash) = self.evidence_hash {
            init = init.with_attr("evidenceHash", hash);
        }
        if let Some(release_id) = self.release_id {
            init = init.with_release(release_id);
        }
        init
    }
}

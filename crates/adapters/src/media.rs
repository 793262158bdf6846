// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Media adapter: caption job lifecycle events

use mesh_core::{EnvelopeInit, Kind, Source};
use serde::{Deserialize, Serialize};

/// One caption job state change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionJob {
    pub job_id: String,
    pub asset_id: String,
    pub service: String,
    /// `queued`, `running`, `completed`, `failed`
    pub status: String,
    /// ISO-8601 event time
    pub ts: String,
    #[serde(default)]
    pub duration_ms: Option<f64>,
    #[serde(default)]
    pub release_id: Option<String>,
}

impl CaptionJob {
    pub fn into_init(self) -> EnvelopeInit {
        let mut init = EnvelopeInit::new(self.ts.as_str(), Source::Media, self.service, Kind::Job)
            .with_asset(self.asset_id)
            .with_attr("id", self.job_id)
            .with_attr("status", self.status);

        if let Some(duration) = self.duration_ms {
            init = init.with_attr("durationMs", duration);
        }
        if let Some(release_id) = self.release_id {
            init = init.with_release(release_id);
        }
        init
    }
}

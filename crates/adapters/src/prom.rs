// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prometheus adapter: scraped metric samples

use mesh_core::{AttrValue, EnvelopeInit, Kind, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scraped sample
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromSample {
    pub metric: String,
    pub value: f64,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl PromSample {
    /// The `job` label names the producing service, falling back to
    /// the scraper itself
    pub fn into_init(self) -> EnvelopeInit {
        let service = self
            .labels
            .get("job")
            .cloned()
            .unwrap_or_else(|| "prom-scraper".to_string());

        let labels: mesh_core::AttrMap = self
            .labels
            .into_iter()
            .map(|(k, v)| (k, AttrValue::Str(v)))
            .collect();

        EnvelopeInit::new(self.timestamp_ms, Source::Prom, service, Kind::Metric)
            .with_attr("metric", self.metric)
            .with_attr("labels", AttrValue::Map(labels))
            .with_body("value", self.value)
    }
}

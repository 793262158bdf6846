// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caption latency rule
//!
//! Active for `assetId` timelines only. Summarizes `durationMs`
//! attributes on media job events and flags a regression when the
//! worst job is far enough above the average and a release is in the
//! picture to blame.

use super::JoinRule;
use mesh_core::{AttrValue, Envelope, KeyType, Kind, Source};

/// Max-over-average ratio at which a regression note fires
const REGRESSION_FACTOR: f64 = 1.2;

pub struct CaptionLatencyRule;

impl JoinRule for CaptionLatencyRule {
    fn name(&self) -> &'static str {
        "caption-latency"
    }

    fn notes(&self, timeline: &[Envelope], key: &str, key_type: KeyType) -> Vec<String> {
        if key_type != KeyType::AssetId {
            return Vec::new();
        }

        let samples: Vec<(&Envelope, f64)> = timeline
            .iter()
            .filter(|e| e.source == Source::Media && e.kind == Kind::Job)
            .filter_map(|e| {
                e.attrs
                    .get("durationMs")
                    .and_then(AttrValue::as_f64)
                    .map(|duration| (e, duration))
            })
            .collect();

        if samples.is_empty() {
            return Vec::new();
        }

        let sum: f64 = samples.iter().map(|(_, d)| d).sum();
        let avg = sum / samples.len() as f64;
        let max = samples.iter().map(|(_, d)| *d).fold(f64::MIN, f64::max);

        let mut notes = vec![format!(
            "Caption latency for asset {}: avg {:.0}ms, max {:.0}ms across {} jobs.",
            key,
            avg,
            max,
            samples.len()
        )];

        let release = samples.iter().find_map(|(e, _)| e.release_id.as_deref());
        if let Some(release) = release {
            if max >= REGRESSION_FACTOR * avg {
                notes.push(format!(
                    "Latency regression suspected around release {}; max {:.0}ms vs avg {:.0}ms.",
                    release, max, avg
                ));
            }
        }

        notes
    }
}

#[cfg(test)]
#[path = "caption_latency_tests.rs"]
mod tests;

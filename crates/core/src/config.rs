// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mesh configuration
//!
//! Loaded from an optional `mesh.toml`. Every field has a default, so
//! a missing file yields a default mesh.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::bus::DEFAULT_SUBSCRIBER_CAPACITY;
use crate::dedupe::DEFAULT_DEDUPE_TTL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Sliding dedupe window, e.g. "5m"
    #[serde(with = "humantime_serde")]
    pub dedupe_ttl: Duration,
    /// Per-subscriber queue depth before drop-newest kicks in
    pub subscriber_capacity: usize,
    /// Extra sensitive terms appended to the built-in redaction set
    pub redact_terms: Vec<String>,
    /// File-backed store path; in-memory when unset
    pub store_path: Option<PathBuf>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            dedupe_ttl: DEFAULT_DEDUPE_TTL,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            redact_terms: Vec::new(),
            store_path: None,
        }
    }
}

impl MeshConfig {
    /// Load from a toml file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed correlation store
//!
//! Persists one JSON array of envelopes per store file. Every append is
//! a read-modify-write of the whole array: this is a throughput
//! ceiling, not a bug, and it assumes a single writer per file. Size
//! the file or rotate it externally; there is no eviction here.

use crate::{CorrelationStore, StoreError};
use mesh_core::{Envelope, KeyType};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open a store at the given path, creating parent directories.
    /// The file itself is created on first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Envelope>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, events: &[Envelope]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(events)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl CorrelationStore for FileStore {
    fn append(&self, envelope: &Envelope) -> Result<(), StoreError> {
        let mut events = self.read_all()?;
        events.push(envelope.clone());
        self.write_all(&events)
    }

    fn find_by_key(&self, key: &str, key_type: KeyType) -> Result<Vec<Envelope>, StoreError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.correlation_key(key_type) == Some(key))
            .collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read_all()?.len())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;

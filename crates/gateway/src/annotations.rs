// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborative annotation channel
//!
//! Append-only message threads keyed per job (or global), with
//! reaction-count mutation only. Each accepted message is also
//! expressible as an envelope — the hook point for systems that want
//! chat activity on a correlated timeline.

use crate::auth::{Principal, Role};
use chrono::{DateTime, Utc};
use mesh_core::{EnvelopeInit, Kind, Redactor, Source, REDACTION_MARKER};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Thread key used when a message carries no job id
pub const GLOBAL_THREAD: &str = "global";

/// One thread message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub author: String,
    pub role: Role,
    pub ts: DateTime<Utc>,
    pub text: String,
    #[serde(default)]
    pub reactions: BTreeMap<String, u32>,
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Paths masked before the message was accepted
    #[serde(default)]
    pub redactions: Vec<String>,
}

impl Annotation {
    /// Envelope form of this message, for mirroring onto the mesh
    pub fn to_envelope_init(&self) -> EnvelopeInit {
        let mut init = EnvelopeInit::new(self.ts, Source::Gateway, "annotations", Kind::Audit)
            .with_attr("id", self.id.clone())
            .with_attr("author", self.author.clone())
            .with_attr("action", "annotation.post")
            .with_body("text", self.text.clone());

        if let Some(job_id) = &self.job_id {
            init = init.with_attr("jobId", job_id.clone());
        }
        init
    }
}

pub struct AnnotationLog {
    redactor: Redactor,
    threads: Mutex<HashMap<String, Vec<Annotation>>>,
}

impl AnnotationLog {
    pub fn new(redactor: Redactor) -> Self {
        Self {
            redactor,
            threads: Mutex::new(HashMap::new()),
        }
    }

    /// Append a message to the per-job (or global) thread
    ///
    /// Attachment names that look sensitive (same term set as envelope
    /// redaction) are masked and recorded in the message's
    /// `redactions`.
    pub fn post(
        &self,
        author: &Principal,
        job_id: Option<String>,
        text: String,
        attachments: Vec<String>,
    ) -> Annotation {
        let mut redactions = Vec::new();
        let attachments: Vec<String> = attachments
            .into_iter()
            .map(|name| {
                if self.redactor.is_sensitive_key(&name) {
                    redactions.push(format!("attachments.{}", name));
                    REDACTION_MARKER.to_string()
                } else {
                    name
                }
            })
            .collect();

        let message = Annotation {
            id: uuid::Uuid::new_v4().to_string(),
            job_id,
            author: author.name.clone(),
            role: author.role,
            ts: Utc::now(),
            text,
            reactions: BTreeMap::new(),
            attachments,
            redactions,
        };

        let thread_key = message
            .job_id
            .clone()
            .unwrap_or_else(|| GLOBAL_THREAD.to_string());
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        threads.entry(thread_key).or_default().push(message.clone());

        message
    }

    /// Increment a reaction count; returns the updated counts, or
    /// `None` for an unknown message id
    pub fn react(&self, message_id: &str, emoji: &str) -> Option<BTreeMap<String, u32>> {
        let mut threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        for messages in threads.values_mut() {
            if let Some(message) = messages.iter_mut().find(|m| m.id == message_id) {
                *message.reactions.entry(emoji.to_string()).or_insert(0) += 1;
                return Some(message.reactions.clone());
            }
        }
        None
    }

    /// Most recent messages, oldest first — the hydrate-then-stream
    /// pattern for consumers attaching to a live thread
    pub fn thread(&self, job_id: Option<&str>, limit: Option<usize>) -> Vec<Annotation> {
        let threads = self.threads.lock().unwrap_or_else(|e| e.into_inner());
        let key = job_id.unwrap_or(GLOBAL_THREAD);
        let messages = threads.get(key).cloned().unwrap_or_default();

        match limit {
            Some(n) if messages.len() > n => messages[messages.len() - n..].to_vec(),
            _ => messages,
        }
    }

    pub fn message_count(&self) -> usize {
        self.threads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(Vec::len)
            .sum()
    }
}

#[cfg(test)]
#[path = "annotations_tests.rs"]
mod tests;

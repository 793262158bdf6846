// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive masking of sensitive fields
//!
//! Runs before an envelope is stored or transmitted. Matching is on
//! object keys only: a key whose lowercase form contains a sensitive
//! term has its value replaced at any nesting depth. Lists and scalars
//! under non-sensitive keys pass through verbatim.

use crate::envelope::Envelope;
use crate::value::{AttrMap, AttrValue};

/// Replacement written over any sensitive value
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Built-in sensitive key terms, matched as lowercase substrings
const DEFAULT_TERMS: [&str; 5] = ["token", "password", "secret", "authorization", "cookie"];

#[derive(Debug, Clone)]
pub struct Redactor {
    terms: Vec<String>,
}

impl Redactor {
    pub fn new() -> Self {
        Self {
            terms: DEFAULT_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Extend the built-in term set with operator-configured terms
    pub fn with_terms(extra: impl IntoIterator<Item = String>) -> Self {
        let mut redactor = Self::new();
        redactor
            .terms
            .extend(extra.into_iter().map(|t| t.to_lowercase()));
        redactor
    }

    /// Returns a redacted copy sharing no nested state with the input
    pub fn redact(&self, envelope: &Envelope) -> Envelope {
        self.redact_report(envelope).0
    }

    /// Like [`Redactor::redact`], also reporting the dotted paths of
    /// every masked key so callers can count redactions.
    pub fn redact_report(&self, envelope: &Envelope) -> (Envelope, Vec<String>) {
        let mut masked = Vec::new();
        let mut out = envelope.clone();
        out.attrs = self.redact_map(&envelope.attrs, "attrs", &mut masked);
        out.body = self.redact_map(&envelope.body, "body", &mut masked);
        (out, masked)
    }

    /// Whether a key would be masked, without redacting anything
    pub fn is_sensitive_key(&self, key: &str) -> bool {
        let lower = key.to_lowercase();
        self.terms.iter().any(|term| lower.contains(term.as_str()))
    }

    fn redact_map(&self, map: &AttrMap, path: &str, masked: &mut Vec<String>) -> AttrMap {
        let mut out = AttrMap::new();
        for (key, value) in map {
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", path, key)
            };

            if self.is_sensitive_key(key) {
                masked.push(child_path);
                out.insert(key.clone(), AttrValue::Str(REDACTION_MARKER.to_string()));
            } else if let AttrValue::Map(nested) = value {
                out.insert(
                    key.clone(),
                    AttrValue::Map(self.redact_map(nested, &child_path, masked)),
                );
            } else {
                // Key matching does not descend into lists
                out.insert(key.clone(), value.clone());
            }
        }
        out
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical event envelope and codec
//!
//! Every producer record is normalized into an [`Envelope`] before it
//! can be stored or delivered. The envelope is a closed, versioned
//! contract: `schema_version` must equal [`SCHEMA_VERSION`] exactly.
//! Envelopes are immutable after creation; [`Envelope::merge`] returns
//! a new envelope, and cloning deep-copies `attrs`/`body` so no nested
//! state is ever shared across a publish boundary.

use crate::value::AttrMap;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version stamped on every envelope. A mismatch is a hard validation
/// failure, not a negotiation point.
pub const SCHEMA_VERSION: &str = "v1";

/// Producer origin of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Otel,
    Prom,
    Audit,
    Media,
    Economy,
    Gateway,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Otel => "otel",
            Source::Prom => "prom",
            Source::Audit => "audit",
            Source::Media => "media",
            Source::Economy => "economy",
            Source::Gateway => "gateway",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "otel" => Ok(Source::Otel),
            "prom" => Ok(Source::Prom),
            "audit" => Ok(Source::Audit),
            "media" => Ok(Source::Media),
            "economy" => Ok(Source::Economy),
            "gateway" => Ok(Source::Gateway),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// Shape discriminator for the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Span,
    Log,
    Metric,
    Audit,
    Job,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Span => "span",
            Kind::Log => "log",
            Kind::Metric => "metric",
            Kind::Audit => "audit",
            Kind::Job => "job",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "span" => Ok(Kind::Span),
            "log" => Ok(Kind::Log),
            "metric" => Ok(Kind::Metric),
            "audit" => Ok(Kind::Audit),
            "job" => Ok(Kind::Job),
            other => Err(format!("unknown kind: {}", other)),
        }
    }
}

/// Ordered severity scale: `debug < info < warn < error < critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Correlation key fields an envelope can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyType {
    TraceId,
    ReleaseId,
    AssetId,
    SimId,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::TraceId => "traceId",
            KeyType::ReleaseId => "releaseId",
            KeyType::AssetId => "assetId",
            KeyType::SimId => "simId",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traceId" | "traceid" | "trace" => Ok(KeyType::TraceId),
            "releaseId" | "releaseid" | "release" => Ok(KeyType::ReleaseId),
            "assetId" | "assetid" | "asset" => Ok(KeyType::AssetId),
            "simId" | "simid" | "sim" => Ok(KeyType::SimId),
            other => Err(format!("unknown key type: {}", other)),
        }
    }
}

/// The canonical normalized event record flowing through the mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Event time, canonical RFC 3339 on the wire
    pub ts: DateTime<Utc>,
    pub source: Source,
    /// Free-text producer name
    pub service: String,
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_id: Option<String>,
    #[serde(default)]
    pub attrs: AttrMap,
    #[serde(default)]
    pub body: AttrMap,
    pub schema_version: String,
}

impl Envelope {
    /// Idempotent validity check, usable on envelopes built by means
    /// other than [`EnvelopeInit::normalize`] (e.g. deserialized from a
    /// file-backed store).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.service.is_empty() {
            return Err(ValidationError::MissingField("service"));
        }
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::SchemaVersion {
                found: self.schema_version.clone(),
            });
        }
        // The canonical form must stay representable
        if self.ts.timestamp_nanos_opt().is_none() {
            return Err(ValidationError::InvalidTimestamp(self.ts.to_rfc3339()));
        }
        Ok(())
    }

    /// The value of the given correlation key field, if present
    pub fn correlation_key(&self, key_type: KeyType) -> Option<&str> {
        match key_type {
            KeyType::TraceId => self.trace_id.as_deref(),
            KeyType::ReleaseId => self.release_id.as_deref(),
            KeyType::AssetId => self.asset_id.as_deref(),
            KeyType::SimId => self.sim_id.as_deref(),
        }
    }

    /// Returns a new envelope with `extra` deep-merged into `attrs`
    /// (extra wins on key collision). The original is untouched.
    pub fn merge(&self, extra: &AttrMap) -> Envelope {
        let mut merged = self.clone();
        deep_merge(&mut merged.attrs, extra);
        merged
    }
}

fn deep_merge(base: &mut AttrMap, extra: &AttrMap) {
    use crate::value::AttrValue;

    for (key, value) in extra {
        match (base.get_mut(key), value) {
            (Some(AttrValue::Map(base_nested)), AttrValue::Map(extra_nested)) => {
                deep_merge(base_nested, extra_nested);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Timestamp forms accepted at the producer boundary
///
/// Untagged: JSON numbers read as epoch millis, strings as ISO-8601.
/// `Instant` is for already-parsed in-process values and never comes
/// off the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampInit {
    EpochMillis(i64),
    Iso(String),
    Instant(DateTime<Utc>),
}

impl TimestampInit {
    fn resolve(&self) -> Result<DateTime<Utc>, ValidationError> {
        match self {
            TimestampInit::Instant(dt) => Ok(*dt),
            TimestampInit::EpochMillis(ms) => Utc
                .timestamp_millis_opt(*ms)
                .single()
                .ok_or_else(|| ValidationError::InvalidTimestamp(ms.to_string())),
            TimestampInit::Iso(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| ValidationError::InvalidTimestamp(s.clone())),
        }
    }
}

impl From<DateTime<Utc>> for TimestampInit {
    fn from(value: DateTime<Utc>) -> Self {
        TimestampInit::Instant(value)
    }
}

impl From<i64> for TimestampInit {
    fn from(value: i64) -> Self {
        TimestampInit::EpochMillis(value)
    }
}

impl From<&str> for TimestampInit {
    fn from(value: &str) -> Self {
        TimestampInit::Iso(value.to_string())
    }
}

/// Producer-facing initializer; [`EnvelopeInit::normalize`] turns it
/// into a validated [`Envelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeInit {
    pub ts: TimestampInit,
    pub source: Source,
    pub service: String,
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_id: Option<String>,
    #[serde(default)]
    pub attrs: AttrMap,
    #[serde(default)]
    pub body: AttrMap,
    /// Caller override; must equal [`SCHEMA_VERSION`] when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
}

impl EnvelopeInit {
    pub fn new(
        ts: impl Into<TimestampInit>,
        source: Source,
        service: impl Into<String>,
        kind: Kind,
    ) -> Self {
        Self {
            ts: ts.into(),
            source,
            service: service.into(),
            kind,
            severity: None,
            trace_id: None,
            span_id: None,
            release_id: None,
            asset_id: None,
            sim_id: None,
            attrs: AttrMap::new(),
            body: AttrMap::new(),
            schema_version: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_trace(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_span(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    pub fn with_release(mut self, release_id: impl Into<String>) -> Self {
        self.release_id = Some(release_id.into());
        self
    }

    pub fn with_asset(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = Some(asset_id.into());
        self
    }

    pub fn with_sim(mut self, sim_id: impl Into<String>) -> Self {
        self.sim_id = Some(sim_id.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<crate::value::AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, key: impl Into<String>, value: impl Into<crate::value::AttrValue>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Normalize into the canonical envelope.
    ///
    /// Converts the timestamp to the single canonical representation,
    /// rejects values that do not parse to a valid instant, and stamps
    /// the schema version (verifying any caller override).
    pub fn normalize(self) -> Result<Envelope, ValidationError> {
        let ts = self.ts.resolve()?;

        if self.service.is_empty() {
            return Err(ValidationError::MissingField("service"));
        }

        let schema_version = match self.schema_version {
            None => SCHEMA_VERSION.to_string(),
            Some(v) if v == SCHEMA_VERSION => v,
            Some(v) => return Err(ValidationError::SchemaVersion { found: v }),
        };

        Ok(Envelope {
            ts,
            source: self.source,
            service: self.service,
            kind: self.kind,
            severity: self.severity,
            trace_id: self.trace_id,
            span_id: self.span_id,
            release_id: self.release_id,
            asset_id: self.asset_id,
            sim_id: self.sim_id,
            attrs: self.attrs,
            body: self.body,
            schema_version,
        })
    }
}

/// Malformed envelope; surfaced to the producer, nothing is ingested
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("schema version mismatch: got {found}")]
    SchemaVersion { found: String },
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;

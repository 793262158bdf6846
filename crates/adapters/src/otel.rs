// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenTelemetry adapter: spans and log records

use mesh_core::{AttrMap, EnvelopeInit, Kind, Severity, Source};
use serde::{Deserialize, Serialize};

/// A finished span as exported by an otel collector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtelSpan {
    pub trace_id: String,
    pub span_id: String,
    pub name: String,
    /// Resource service name
    pub service: String,
    pub start_time_unix_ms: i64,
    #[serde(default)]
    pub duration_ms: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub attributes: AttrMap,
}

impl OtelSpan {
    pub fn into_init(self) -> EnvelopeInit {
        let mut init = EnvelopeInit::new(
            self.start_time_unix_ms,
            Source::Otel,
            self.service,
            Kind::Span,
        )
        .with_trace(self.trace_id)
        .with_span(self.span_id)
        .with_attr("name", self.name);

        if let Some(duration) = self.duration_ms {
            init = init.with_attr("durationMs", duration);
        }
        if let Some(status) = self.status {
            init = init.with_attr("status", status);
        }
        init.attrs.extend(self.attributes);
        init
    }
}

/// A log record as exported by an otel collector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtelLogRecord {
    pub service: String,
    pub time_unix_ms: i64,
    #[serde(default)]
    pub severity_text: Option<String>,
    pub body: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub span_id: Option<String>,
    #[serde(default)]
    pub attributes: AttrMap,
}

impl OtelLogRecord {
    pub fn into_init(self) -> EnvelopeInit {
        let mut init = EnvelopeInit::new(self.time_unix_ms, Source::Otel, self.service, Kind::Log)
            .with_body("message", self.body);

        // Unknown severity text is dropped, not an error
        if let Some(severity) = self
            .severity_text
            .as_deref()
            .and_then(|s| s.to_lowercase().parse::<Severity>().ok())
        {
            init = init.with_severity(severity);
        }
        if let Some(trace_id) = self.trace_id {
            init = init.with_trace(trace_id);
        }
        if let Some(span_id) = self.span_id {
            init = init.with_span(span_id);
        }
        init.attrs.extend(self.attributes);
        init
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_core::{attr_map, AttrValue};

    #[test]
    fn span_maps_to_span_envelope() {
        let span = OtelSpan {
            trace_id: "t-1".to_string(),
            span_id: "s-1".to_string(),
            name: "GET /checkout".to_string(),
            service: "checkout".to_string(),
            start_time_unix_ms: 1_769_940_000_000,
            duration_ms: Some(12.5),
            status: Some("ok".to_string()),
            attributes: attr_map([("http.method", "GET")]),
        };

        let envelope = span.into_init().normalize().unwrap();

        assert_eq!(envelope.source, Source::Otel);
        assert_eq!(envelope.kind, Kind::Span);
        assert_eq!(envelope.trace_id.as_deref(), Some("t-1"));
        assert_eq!(envelope.span_id.as_deref(), Some("s-1"));
        assert_eq!(
            envelope.attrs.get("durationMs").and_then(AttrValue::as_f64),
            Some(12.5)
        );
        assert_eq!(
            envelope.attrs.get("http.method").and_then(AttrValue::as_str),
            Some("GET")
        );
    }

    #[test]
    fn log_record_maps_severity_and_body() {
        let record = OtelLogRecord {
            service: "checkout".to_string(),
            time_unix_ms: 1_769_940_000_000,
            severity_text: Some("ERROR".to_string()),
            body: "payment declined".to_string(),
            trace_id: Some("t-1".to_string()),
            span_id: None,
            attributes: AttrMap::new(),
        };

        let envelope = record.into_init().normalize().unwrap();

        assert_eq!(envelope.kind, Kind::Log);
        assert_eq!(envelope.severity, Some(Severity::Error));
        assert_eq!(
            envelope.body.get("message").and_then(AttrValue::as_str),
            Some("payment declined")
        );
    }

    #[test]
    fn unknown_severity_text_is_dropped() {
        let record = OtelLogRecord {
            service: "checkout".to_string(),
            time_unix_ms: 1_769_940_000_000,
            severity_text: Some("TRACE9".to_string()),
            body: "noise".to_string(),
            trace_id: None,
            span_id: None,
            attributes: AttrMap::new(),
        };

        let envelope = record.into_init().normalize().unwrap();
        assert_eq!(envelope.severity, None);
    }
}

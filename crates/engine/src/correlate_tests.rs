use super::*;
use mesh_core::{EnvelopeInit, Kind, Source};
use mesh_storage::MemoryStore;

fn trace_event(trace_id: &str, ts: &str, service: &str) -> Envelope {
    EnvelopeInit::new(ts, Source::Otel, service, Kind::Span)
        .with_trace(trace_id)
        .normalize()
        .unwrap()
}

#[test]
fn timeline_sorted_ascending_regardless_of_insertion_order() {
    let engine = CorrelationEngine::new(MemoryStore::new());

    engine
        .ingest(&trace_event("t-1", "2026-02-01T10:02:00Z", "late"))
        .unwrap();
    engine
        .ingest(&trace_event("t-1", "2026-02-01T10:00:00Z", "early"))
        .unwrap();
    engine
        .ingest(&trace_event("t-1", "2026-02-01T10:01:00Z", "middle"))
        .unwrap();

    let result = engine.correlate("t-1", KeyType::TraceId).unwrap();

    let services: Vec<&str> = result.timeline.iter().map(|e| e.service.as_str()).collect();
    assert_eq!(services, vec!["early", "middle", "late"]);
}

#[test]
fn equal_timestamps_keep_insertion_order() {
    let engine = CorrelationEngine::new(MemoryStore::new());

    engine
        .ingest(&trace_event("t-1", "2026-02-01T10:00:00Z", "first"))
        .unwrap();
    engine
        .ingest(&trace_event("t-1", "2026-02-01T10:00:00Z", "second"))
        .unwrap();

    let result = engine.correlate("t-1", KeyType::TraceId).unwrap();

    let services: Vec<&str> = result.timeline.iter().map(|e| e.service.as_str()).collect();
    assert_eq!(services, vec!["first", "second"]);
}

#[test]
fn unknown_key_yields_empty_timeline_and_no_notes() {
    let engine = CorrelationEngine::new(MemoryStore::new());

    let result = engine.correlate("missing", KeyType::ReleaseId).unwrap();
    assert!(result.timeline.is_empty());
    assert!(result.notes.is_empty());
}

#[test]
fn notes_preserve_rule_registration_order() {
    struct Fixed(&'static str);
    impl JoinRule for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        fn notes(&self, _timeline: &[Envelope], _key: &str, _key_type: KeyType) -> Vec<String> {
            vec![self.0.to_string()]
        }
    }

    let mut engine = CorrelationEngine::with_rules(MemoryStore::new(), vec![Box::new(Fixed("a"))]);
    engine.register_rule(Box::new(Fixed("b")));
    engine.register_rule(Box::new(Fixed("c")));

    let result = engine.correlate("t-1", KeyType::TraceId).unwrap();
    assert_eq!(result.notes, vec!["a", "b", "c"]);
}

#[test]
fn release_incident_scenario_end_to_end() {
    let engine = CorrelationEngine::new(MemoryStore::new());

    let deploy = EnvelopeInit::new("2026-02-01T10:00:00Z", Source::Audit, "deployer", Kind::Audit)
        .with_release("rel-1")
        .with_attr("action", "deploy.create")
        .normalize()
        .unwrap();
    let incident = EnvelopeInit::new("2026-02-01T10:05:00Z", Source::Gateway, "api", Kind::Log)
        .with_release("rel-1")
        .with_attr("route", "/incidents")
        .normalize()
        .unwrap();

    engine.ingest(&deploy).unwrap();
    engine.ingest(&incident).unwrap();

    let result = engine.correlate("rel-1", KeyType::ReleaseId).unwrap();

    assert_eq!(result.timeline.len(), 2);
    assert!(result.notes.contains(
        &"Release rel-1 aligns with an incident window; review error rates.".to_string()
    ));
}

#[test]
fn timeline_serializes_camel_case() {
    let engine = CorrelationEngine::new(MemoryStore::new());
    let result = engine.correlate("t-1", KeyType::TraceId).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["keyType"], "traceId");
    assert_eq!(json["key"], "t-1");
}

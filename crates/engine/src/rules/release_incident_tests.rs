use super::*;
use mesh_core::EnvelopeInit;

fn deploy(release_id: &str) -> Envelope {
    EnvelopeInit::new("2026-02-01T10:00:00Z", Source::Audit, "deployer", Kind::Audit)
        .with_release(release_id)
        .with_attr("action", "deploy.create")
        .normalize()
        .unwrap()
}

fn incident_log(release_id: &str) -> Envelope {
    EnvelopeInit::new("2026-02-01T10:05:00Z", Source::Gateway, "api", Kind::Log)
        .with_release(release_id)
        .with_attr("route", "/incidents")
        .normalize()
        .unwrap()
}

#[test]
fn deploy_plus_incident_emits_alignment_warning() {
    let timeline = vec![deploy("rel-1"), incident_log("rel-1")];

    let notes = ReleaseIncidentRule.notes(&timeline, "rel-1", KeyType::ReleaseId);

    assert_eq!(
        notes,
        vec!["Release rel-1 aligns with an incident window; review error rates.".to_string()]
    );
}

#[test]
fn deploy_alone_emits_clean_note() {
    let timeline = vec![deploy("rel-1")];

    let notes = ReleaseIncidentRule.notes(&timeline, "rel-1", KeyType::ReleaseId);

    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("no incident activity"));
}

#[test]
fn incident_alone_emits_nothing() {
    let timeline = vec![incident_log("rel-1")];

    assert!(ReleaseIncidentRule
        .notes(&timeline, "rel-1", KeyType::ReleaseId)
        .is_empty());
}

#[test]
fn nested_incident_routes_count() {
    let deep = EnvelopeInit::new("2026-02-01T10:05:00Z", Source::Gateway, "api", Kind::Log)
        .with_release("rel-1")
        .with_attr("route", "/incidents/inc-42")
        .normalize()
        .unwrap();
    let timeline = vec![deploy("rel-1"), deep];

    let notes = ReleaseIncidentRule.notes(&timeline, "rel-1", KeyType::ReleaseId);
    assert!(notes[0].contains("incident window"));
}

#[test]
fn inactive_for_other_key_types() {
    let timeline = vec![deploy("rel-1"), incident_log("rel-1")];

    for key_type in [KeyType::TraceId, KeyType::AssetId, KeyType::SimId] {
        assert!(ReleaseIncidentRule
            .notes(&timeline, "rel-1", key_type)
            .is_empty());
    }
}

use super::*;
use crate::clock::FakeClock;
use crate::envelope::{EnvelopeInit, Kind, Source};
use std::time::Duration;

fn envelope_at(clock: &FakeClock) -> Envelope {
    EnvelopeInit::new(clock.now_utc(), Source::Media, "captioner", Kind::Job)
        .normalize()
        .unwrap()
}

#[test]
fn ingest_counts_by_source_and_kind() {
    let clock = FakeClock::new();
    let recorder = TelemetryRecorder::with_clock(clock.clone());
    let envelope = envelope_at(&clock);

    recorder.record_ingest(&envelope);
    recorder.record_ingest(&envelope);

    let snapshot = recorder.snapshot();
    assert_eq!(snapshot.ingest.get("media/job"), Some(&2));
}

#[test]
fn lag_gauge_tracks_now_minus_ts() {
    let clock = FakeClock::new();
    let recorder = TelemetryRecorder::with_clock(clock.clone());
    let envelope = envelope_at(&clock);

    clock.advance(Duration::from_millis(1500));
    recorder.record_ingest(&envelope);

    let snapshot = recorder.snapshot();
    assert_eq!(snapshot.lag_ms.get("media"), Some(&1500));
}

#[test]
fn lag_is_clamped_at_zero_for_future_timestamps() {
    let clock = FakeClock::new();
    let recorder = TelemetryRecorder::with_clock(clock.clone());

    let future = EnvelopeInit::new(
        clock.now_utc() + chrono::Duration::seconds(30),
        Source::Otel,
        "checkout",
        Kind::Span,
    )
    .normalize()
    .unwrap();

    recorder.record_ingest(&future);

    let snapshot = recorder.snapshot();
    assert_eq!(snapshot.lag_ms.get("otel"), Some(&0));
}

#[test]
fn dedupe_drops_counted_separately() {
    let clock = FakeClock::new();
    let recorder = TelemetryRecorder::with_clock(clock.clone());
    let envelope = envelope_at(&clock);

    recorder.record_dedupe(&envelope);

    let snapshot = recorder.snapshot();
    assert_eq!(snapshot.dedupe_drops.get("media/job"), Some(&1));
    assert!(snapshot.ingest.is_empty());
}

#[test]
fn redactions_counted_per_field() {
    let recorder = TelemetryRecorder::new();

    recorder.record_redaction("attrs.authorization");
    recorder.record_redaction("attrs.authorization");
    recorder.record_redaction("body.token");

    let snapshot = recorder.snapshot();
    assert_eq!(snapshot.redactions.get("attrs.authorization"), Some(&2));
    assert_eq!(snapshot.redactions.get("body.token"), Some(&1));
}

#[test]
fn subscriber_drops_accumulate_and_zero_is_a_noop() {
    let recorder = TelemetryRecorder::new();

    recorder.record_subscriber_drops(0);
    recorder.record_subscriber_drops(3);
    recorder.record_subscriber_drops(2);

    assert_eq!(recorder.snapshot().subscriber_drops, 5);
}

use super::*;

#[test]
fn system_clock_advances() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}

#[test]
fn fake_clock_advance_moves_both_times() {
    let clock = FakeClock::new();
    let instant_before = clock.now();
    let utc_before = clock.now_utc();

    clock.advance(Duration::from_secs(90));

    assert_eq!(clock.now() - instant_before, Duration::from_secs(90));
    assert_eq!(
        clock.now_utc() - utc_before,
        chrono::Duration::seconds(90)
    );
}

#[test]
fn fake_clock_clones_share_time() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();

    clock1.advance(Duration::from_secs(5));

    assert_eq!(clock1.now(), clock2.now());
    assert_eq!(clock1.now_utc(), clock2.now_utc());
}

#[test]
fn fake_clock_pinned_to_utc() {
    let pinned = "2026-02-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let clock = FakeClock::at(pinned);
    assert_eq!(clock.now_utc(), pinned);
}

//! Integration Tests - Do components work together?
//!
//! Every scenario drives a full MonitorSession with a synthetic
//! timeline (explicit Instants, no sleeping) and checks what comes out
//! the other end: verdicts, levels, events, channel calls.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use cribwatch::{
    AlertLevel, AlertSink, EscalationStrategy, MonitorConfig, MonitorSession, PushNote,
    RawReadingEvent, RawValue, SensorKind, SensorReading, SessionEvent, SinkError, Threshold,
    ThresholdTable, TimePoint,
};

/// Records every channel invocation; can be told to fail the sound path.
#[derive(Default)]
struct RecordingSink {
    log: Arc<Mutex<Vec<String>>>,
    fail_sound: bool,
}

impl AlertSink for RecordingSink {
    fn play_sound(&mut self, level: AlertLevel) -> Result<(), SinkError> {
        if self.fail_sound {
            return Err(SinkError::new("sound", "player unavailable"));
        }
        self.log.lock().unwrap().push(format!("sound:{}", level.name()));
        Ok(())
    }

    fn haptic_pulse(&mut self, level: AlertLevel) {
        self.log.lock().unwrap().push(format!("haptic:{}", level.name()));
    }

    fn push_note(&mut self, note: &PushNote) -> Result<(), SinkError> {
        self.log.lock().unwrap().push(format!("push:{}", note.title));
        Ok(())
    }
}

fn session_with_sink(
    strategy: EscalationStrategy,
    fail_sound: bool,
) -> (MonitorSession, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = RecordingSink {
        log: log.clone(),
        fail_sound,
    };
    let config = MonitorConfig {
        strategy,
        ..Default::default()
    };
    let session = MonitorSession::new(config, ThresholdTable::infant_defaults(), Box::new(sink));
    (session, log)
}

fn reading(kind: SensorKind, value: f64, base: Instant, millis: u64) -> SensorReading {
    SensorReading::new(
        kind,
        value,
        TimePoint::from_parts(base + Duration::from_millis(millis), SystemTime::now()),
    )
}

/// I1: A sensor without a threshold never changes state or level
#[test]
fn integration_missing_threshold_is_inert() {
    let base = Instant::now();
    let mut session = MonitorSession::new(
        MonitorConfig::default(),
        ThresholdTable::empty(),
        Box::new(cribwatch::NullSink),
    );

    for i in 0..5 {
        session.handle_reading(&reading(SensorKind::Sound, 95.0, base, i * 100));
        session.handle_reading(&reading(SensorKind::Weight, 0.5, base, i * 100));
    }
    session.tick(base + Duration::from_secs(30));

    assert_eq!(session.level(), AlertLevel::Safe);
    assert!(session.is_safe(SensorKind::Sound));
    assert!(session.is_safe(SensorKind::Weight));
    assert_eq!(session.stats().evaluations_skipped, 10);
    assert_eq!(session.stats().alerts_fired, 0);
}

/// I2: A motion burst shorter than the sustain window never escalates;
/// a standing breach does
#[test]
fn integration_motion_sustain_window() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);

    // Burst: 3 s of thrashing, then calm (window is 5 s)
    session.handle_reading(&reading(SensorKind::Motion, 3.0, base, 0));
    session.handle_reading(&reading(SensorKind::Motion, 2.5, base, 2_000));
    session.handle_reading(&reading(SensorKind::Motion, 0.3, base, 3_000));
    session.tick(base + Duration::from_secs(10));
    assert_eq!(session.level(), AlertLevel::Safe);
    assert!(session.is_safe(SensorKind::Motion));

    // Standing breach: above trigger continuously past the window
    let base2 = base + Duration::from_secs(20);
    session.handle_reading(&reading(SensorKind::Motion, 3.0, base2, 0));
    session.handle_reading(&reading(SensorKind::Motion, 2.8, base2, 4_000));
    session.tick(base2 + Duration::from_secs(5));
    assert!(!session.is_safe(SensorKind::Motion));
    assert_eq!(session.level(), AlertLevel::Minor);
}

/// I3: One loud sample decays back to safe exactly once
#[test]
fn integration_sound_decays_once() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);
    let rx = session.subscribe();

    session.handle_reading(&reading(SensorKind::Sound, 85.0, base, 0));
    assert!(!session.is_safe(SensorKind::Sound));

    // Quiet readings inside the decay window change nothing
    session.handle_reading(&reading(SensorKind::Sound, 30.0, base, 1_000));
    session.handle_reading(&reading(SensorKind::Sound, 28.0, base, 2_000));

    session.tick(base + Duration::from_secs(5));
    assert!(session.is_safe(SensorKind::Sound));
    assert_eq!(session.level(), AlertLevel::Safe);

    // Exactly one unsafe flip and one safe flip on the sound channel
    let flips: Vec<_> = rx
        .try_iter()
        .filter(|e| matches!(e, SessionEvent::SafetyChanged { kind: SensorKind::Sound, .. }))
        .collect();
    assert_eq!(flips.len(), 2);

    // Further ticks are no-ops
    session.tick(base + Duration::from_secs(20));
    assert!(rx.try_iter().count() == 0);
}

/// I4: Weight judges deltas, not absolute position
#[test]
fn integration_weight_delta_rules() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);

    session.handle_reading(&reading(SensorKind::Weight, 5.0, base, 0));
    // +0.3 within the 0.5 rate bound
    session.handle_reading(&reading(SensorKind::Weight, 5.3, base, 2_000));
    assert!(session.is_safe(SensorKind::Weight));

    // 1.5 kg drop exceeds the 1.0 drop bound
    session.handle_reading(&reading(SensorKind::Weight, 3.8, base, 4_000));
    assert!(!session.is_safe(SensorKind::Weight));
    assert_eq!(session.level(), AlertLevel::Minor);

    // Recovery is judged against the advanced history (3.8), so a
    // small step back up is safe again
    session.handle_reading(&reading(SensorKind::Weight, 4.0, base, 6_000));
    assert!(session.is_safe(SensorKind::Weight));
    assert_eq!(session.level(), AlertLevel::Safe);
}

/// I5: Priority-weighted strategy: two distress sensors is Critical
#[test]
fn integration_priority_weighted_critical() {
    let base = Instant::now();
    let (mut session, log) = session_with_sink(EscalationStrategy::PriorityWeighted, false);

    session.handle_reading(&reading(SensorKind::Sound, 90.0, base, 0));
    assert_eq!(session.level(), AlertLevel::Moderate);

    session.handle_reading(&reading(SensorKind::Weight, 5.0, base, 100));
    session.handle_reading(&reading(SensorKind::Weight, 3.0, base, 200));
    assert_eq!(session.level(), AlertLevel::Critical);

    // The Moderate fire consumed the cooldown; Critical arrived inside it
    let log = log.lock().unwrap();
    assert!(log.contains(&"sound:Moderate".to_string()));
    assert!(log.contains(&"push:Moderate alert".to_string()));
}

/// I6: Uniform-count strategy: two unsafe sensors is Moderate
#[test]
fn integration_uniform_count_moderate() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);

    session.handle_reading(&reading(SensorKind::Temperature, 30.0, base, 0));
    session.handle_reading(&reading(SensorKind::Humidity, 80.0, base, 100));
    assert_eq!(session.level(), AlertLevel::Moderate);
    assert_eq!(session.stats().alerts_fired, 1);
}

/// I7: Two escalations 2 s apart with a 5 s cooldown fire once
#[test]
fn integration_cooldown_single_fire() {
    let base = Instant::now();
    let (mut session, log) = session_with_sink(EscalationStrategy::UniformCount, false);

    // First escalation to Moderate
    session.handle_reading(&reading(SensorKind::Temperature, 30.0, base, 0));
    session.handle_reading(&reading(SensorKind::Humidity, 80.0, base, 100));
    assert_eq!(session.stats().alerts_fired, 1);

    // 2 s later a third sensor pushes to Critical, inside the cooldown
    session.handle_reading(&reading(SensorKind::Sound, 90.0, base, 2_000));
    assert_eq!(session.level(), AlertLevel::Critical);
    assert_eq!(session.stats().alerts_fired, 1);
    assert_eq!(session.stats().fires_blocked, 1);
    assert_eq!(log.lock().unwrap().len(), 3);
}

/// I8: Cancellation silences alerts for the suppression window and
/// optimistically clears every verdict
#[test]
fn integration_cancellation_suppression() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);

    session.handle_reading(&reading(SensorKind::Temperature, 30.0, base, 0));
    session.handle_reading(&reading(SensorKind::Humidity, 80.0, base, 100));
    assert!(session.popup_visible());

    session.cancel_alert(base + Duration::from_secs(1));
    assert!(!session.popup_visible());
    assert_eq!(session.level(), AlertLevel::Safe);
    for kind in SensorKind::ALL {
        assert!(session.is_safe(kind));
    }

    // Re-escalation 30 s later: state tracks, channels stay silent
    session.handle_reading(&reading(SensorKind::Temperature, 31.0, base, 30_000));
    session.handle_reading(&reading(SensorKind::Humidity, 85.0, base, 30_100));
    assert_eq!(session.level(), AlertLevel::Moderate);
    assert_eq!(session.stats().alerts_fired, 1);

    // After the 60 s window a fresh escalation fires again
    session.cancel_alert(base + Duration::from_secs(31));
    session.handle_reading(&reading(SensorKind::Temperature, 32.0, base, 95_000));
    session.handle_reading(&reading(SensorKind::Humidity, 90.0, base, 95_100));
    assert_eq!(session.stats().alerts_fired, 2);
}

/// I9: Repeated identical readings never re-aggregate or re-fire
#[test]
fn integration_idempotent_aggregation() {
    let base = Instant::now();
    let (mut session, log) = session_with_sink(EscalationStrategy::UniformCount, false);

    session.handle_reading(&reading(SensorKind::Temperature, 30.0, base, 0));
    session.handle_reading(&reading(SensorKind::Humidity, 80.0, base, 100));
    let fired = session.stats().alerts_fired;
    let calls = log.lock().unwrap().len();
    session.drain_events();

    // Same out-of-range values, over and over
    for i in 1..20 {
        session.handle_reading(&reading(SensorKind::Temperature, 30.0, base, i * 1_000));
        session.handle_reading(&reading(SensorKind::Humidity, 80.0, base, i * 1_000 + 100));
    }

    assert_eq!(session.stats().alerts_fired, fired);
    assert_eq!(session.stats().fires_blocked, 0);
    assert_eq!(log.lock().unwrap().len(), calls);
    assert!(session.drain_events().is_empty());
}

/// I10: A failing sound channel never blocks haptics, push or popup
#[test]
fn integration_sound_failure_degrades_gracefully() {
    let base = Instant::now();
    let (mut session, log) = session_with_sink(EscalationStrategy::UniformCount, true);

    session.handle_reading(&reading(SensorKind::Temperature, 30.0, base, 0));
    session.handle_reading(&reading(SensorKind::Humidity, 80.0, base, 100));

    assert!(session.popup_visible());
    assert_eq!(session.stats().alerts_fired, 1);
    let log = log.lock().unwrap();
    assert!(log.contains(&"haptic:Moderate".to_string()));
    assert!(log.contains(&"push:Moderate alert".to_string()));
    assert!(!log.iter().any(|l| l.starts_with("sound:")));
}

/// I11: Raw wire feed end to end, malformed rows included
#[test]
fn integration_raw_feed_pipeline() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);
    let at = |ms: u64| TimePoint::from_parts(base + Duration::from_millis(ms), SystemTime::now());

    // Firmware mixes numbers and strings; one garbled row, one pitch row
    let rows = vec![
        (0u64, 1u32, RawValue::Text("29.5".to_string())),
        (100, 2, RawValue::Number(45.0)),
        (200, 3, RawValue::Text("not-a-number".to_string())),
        (300, 6, RawValue::Number(440.0)),
        (400, 5, RawValue::Number(4.2)),
    ];
    for (ms, id, value) in rows {
        session.handle_raw(
            &RawReadingEvent {
                sensor_type_id: id,
                value,
            },
            at(ms),
        );
    }

    assert_eq!(session.stats().readings_accepted, 3);
    assert_eq!(session.stats().readings_rejected, 2);
    assert!(!session.is_safe(SensorKind::Temperature));
    assert_eq!(session.level(), AlertLevel::Minor);
}

/// I12: Popup auto-hides 5 s after a fire while the level stands
#[test]
fn integration_popup_auto_hide() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);

    session.handle_reading(&reading(SensorKind::Temperature, 30.0, base, 0));
    session.handle_reading(&reading(SensorKind::Humidity, 80.0, base, 100));
    assert!(session.popup_visible());
    session.drain_events();

    session.tick(base + Duration::from_millis(5_200));
    assert!(!session.popup_visible());
    assert_eq!(session.level(), AlertLevel::Moderate);
    assert!(session
        .drain_events()
        .contains(&SessionEvent::PopupHidden));
}

/// I13: Threshold update takes effect on the next reading
#[test]
fn integration_threshold_update_applies() {
    let base = Instant::now();
    let (mut session, _log) = session_with_sink(EscalationStrategy::UniformCount, false);

    session.handle_reading(&reading(SensorKind::Temperature, 27.5, base, 0));
    assert!(session.is_safe(SensorKind::Temperature));

    // Tighten the ceiling below the current value
    session.update_threshold(
        SensorKind::Temperature,
        Threshold::new(24.0, 26.0),
        base + Duration::from_secs(1),
    );
    // Old verdict stands until a new reading arrives
    assert!(session.is_safe(SensorKind::Temperature));

    session.handle_reading(&reading(SensorKind::Temperature, 27.5, base, 2_000));
    assert!(!session.is_safe(SensorKind::Temperature));
}

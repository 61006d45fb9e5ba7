//! ═══════════════════════════════════════════════════════════════════════════════
//! SESSION — Per-Subject Monitoring State Machine
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! One MonitorSession per monitored subject. It owns every mutable
//! piece of the pipeline (thresholds, verdicts, filters, timers,
//! dispatcher) and is the only place any of them change. Hosts call in
//! with readings, threshold updates, cancellations and ticks; state
//! changes come back out as SessionEvents.
//!
//! The session is single-threaded by construction. Multi-threaded
//! hosts wrap it in SharedSession (one mutex around the whole thing).
//! ═══════════════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MonitorConfig;
use crate::dispatch::{AlertSink, DispatchOutcome, NotificationDispatcher, NullSink};
use crate::evaluator;
use crate::filters::{MotionFilter, SoundFilter, WeightFilter};
use crate::ingest::{self, RawReadingEvent, RawThresholdEvent};
use crate::level::{policy_for, AlertLevel, EscalationPolicy};
use crate::timer::{TimerKind, TimerQueue};
use crate::types::{SensorKind, SensorReading, Threshold, ThresholdTable, TimePoint};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS — What the presentation layer consumes
// ═══════════════════════════════════════════════════════════════════════════════

/// State-change notifications. UI-framework independent: a host maps
/// these onto whatever rendering it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A sensor's stabilized verdict flipped
    SafetyChanged { kind: SensorKind, safe: bool },
    /// The aggregate level moved
    LevelChanged { from: AlertLevel, to: AlertLevel },
    /// An alert reached the notification channels
    AlertFired { level: AlertLevel },
    /// The alert popup went away (auto-hide, cancel, or return to safe)
    PopupHidden,
    /// A reading arrived for a sensor with no threshold yet
    EvaluationSkipped { kind: SensorKind },
    /// A wire event failed validation and was dropped
    ReadingRejected { sensor_id: u32 },
}

/// Monotone counters for observability and tests.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SessionStats {
    pub readings_accepted: u64,
    pub readings_rejected: u64,
    pub evaluations_skipped: u64,
    pub alerts_fired: u64,
    pub fires_blocked: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

pub struct MonitorSession {
    config: MonitorConfig,
    thresholds: ThresholdTable,
    safety: HashMap<SensorKind, bool>,
    motion: MotionFilter,
    sound: SoundFilter,
    weight: WeightFilter,
    timers: TimerQueue,
    dispatcher: NotificationDispatcher,
    policy: Box<dyn EscalationPolicy>,
    level: AlertLevel,
    stats: SessionStats,
    events: Vec<SessionEvent>,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl MonitorSession {
    pub fn new(config: MonitorConfig, thresholds: ThresholdTable, sink: Box<dyn AlertSink>) -> Self {
        let safety = SensorKind::ALL.iter().map(|&k| (k, true)).collect();
        let policy = policy_for(config.strategy);
        let weight = WeightFilter::new(config.weight_history_depth);
        let dispatcher = NotificationDispatcher::new(&config, sink);
        Self {
            config,
            thresholds,
            safety,
            motion: MotionFilter::new(),
            sound: SoundFilter::new(),
            weight,
            timers: TimerQueue::new(),
            dispatcher,
            policy,
            level: AlertLevel::Safe,
            stats: SessionStats::default(),
            events: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Default config, infant default thresholds, no channels.
    pub fn with_defaults() -> Self {
        Self::new(
            MonitorConfig::default(),
            ThresholdTable::infant_defaults(),
            Box::new(NullSink),
        )
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Inbound operations
    // ───────────────────────────────────────────────────────────────────────────

    /// Feed one validated reading through evaluation, filtering and
    /// aggregation.
    pub fn handle_reading(&mut self, reading: &SensorReading) {
        let now = reading.at.mono;
        self.stats.readings_accepted += 1;

        let threshold = match self.thresholds.get(reading.kind) {
            Some(t) => *t,
            None => {
                self.stats.evaluations_skipped += 1;
                warn!(sensor = reading.kind.name(), "no threshold configured, skipping evaluation");
                self.emit(SessionEvent::EvaluationSkipped { kind: reading.kind });
                return;
            }
        };

        let safe = match reading.kind {
            SensorKind::Temperature | SensorKind::Humidity => {
                evaluator::evaluate_range(reading.kind, reading.value, &threshold).unwrap_or(true)
            }
            SensorKind::Sound => self.sound.on_sample(
                reading.value,
                &threshold,
                self.config.strict_sound_confirmation,
                self.config.sound_decay(),
                now,
                &mut self.timers,
            ),
            SensorKind::Motion => {
                self.motion
                    .on_sample(reading.value, &threshold, now, &mut self.timers)
            }
            SensorKind::Weight => {
                self.weight
                    .on_sample(reading.value, &threshold, self.config.weight_policy)
            }
        };

        self.set_safety(reading.kind, safe, now);
    }

    /// Feed one raw wire event. Malformed rows are dropped, counted
    /// and logged; no error escapes.
    pub fn handle_raw(&mut self, event: &RawReadingEvent, at: TimePoint) {
        match ingest::parse_reading(event, at) {
            Ok(reading) => self.handle_reading(&reading),
            Err(e) => {
                self.stats.readings_rejected += 1;
                warn!(error = %e, "dropping malformed reading");
                self.emit(SessionEvent::ReadingRejected {
                    sensor_id: event.sensor_type_id,
                });
            }
        }
    }

    /// Replace a sensor's threshold. Takes effect on the next reading;
    /// the snapshot is re-aggregated at once so a previously excluded
    /// sensor starts counting.
    pub fn update_threshold(&mut self, kind: SensorKind, threshold: Threshold, now: Instant) {
        self.thresholds.set(kind, threshold);
        debug!(sensor = kind.name(), min = threshold.min, max = threshold.max, "threshold updated");
        self.reaggregate(now);
    }

    /// Apply a raw threshold row from the feed.
    pub fn handle_raw_threshold(&mut self, event: &RawThresholdEvent, now: Instant) {
        match ingest::parse_threshold(event) {
            Ok((kind, threshold)) => self.update_threshold(kind, threshold, now),
            Err(e) => {
                warn!(error = %e, "dropping malformed threshold row");
            }
        }
    }

    /// User pressed cancel on the popup: hide it, optimistically clear
    /// every verdict, and silence the channels for the suppression
    /// window. Filter latches reset with the verdicts so a stale latch
    /// cannot re-trip on the next quiet sample.
    pub fn cancel_alert(&mut self, now: Instant) {
        if self.dispatcher.cancel(now, &mut self.timers) {
            self.emit(SessionEvent::PopupHidden);
        }

        self.motion = MotionFilter::new();
        self.sound = SoundFilter::new();
        self.timers.cancel(TimerKind::MotionSustain);
        self.timers.cancel(TimerKind::SoundDecay);

        let flipped: Vec<SensorKind> = self
            .safety
            .iter()
            .filter(|(_, &safe)| !safe)
            .map(|(&k, _)| k)
            .collect();
        for kind in flipped {
            self.safety.insert(kind, true);
            self.emit(SessionEvent::SafetyChanged { kind, safe: true });
        }
        self.reaggregate(now);
    }

    /// Drive expired timers. Hosts call this from their event loop;
    /// `next_deadline` says how long they may sleep.
    pub fn tick(&mut self, now: Instant) {
        for timer in self.timers.pop_due(now) {
            match timer {
                TimerKind::MotionSustain => {
                    let safe = self.motion.on_sustain_elapsed();
                    self.set_safety(SensorKind::Motion, safe, now);
                }
                TimerKind::SoundDecay => {
                    let safe = self.sound.on_decay_elapsed();
                    self.set_safety(SensorKind::Sound, safe, now);
                }
                TimerKind::PopupAutoHide => {
                    if self.dispatcher.on_auto_hide_elapsed() {
                        self.emit(SessionEvent::PopupHidden);
                    }
                }
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Aggregation
    // ───────────────────────────────────────────────────────────────────────────

    fn set_safety(&mut self, kind: SensorKind, safe: bool, now: Instant) {
        let previous = self.safety.get(&kind).copied().unwrap_or(true);
        if previous == safe {
            // Unchanged verdict: the snapshot is identical, skip
            // re-aggregation entirely.
            return;
        }
        self.safety.insert(kind, safe);
        self.emit(SessionEvent::SafetyChanged { kind, safe });
        self.reaggregate(now);
    }

    fn reaggregate(&mut self, now: Instant) {
        // Sensors without thresholds are not judged and must not vote.
        let snapshot: Vec<(SensorKind, bool)> = SensorKind::ALL
            .iter()
            .filter(|&&k| self.thresholds.get(k).is_some())
            .map(|&k| (k, self.safety.get(&k).copied().unwrap_or(true)))
            .collect();

        let new_level = self.policy.aggregate(&snapshot);
        if new_level == self.level {
            return;
        }

        let from = self.level;
        self.level = new_level;
        self.emit(SessionEvent::LevelChanged {
            from,
            to: new_level,
        });

        if new_level == AlertLevel::Safe {
            if self.dispatcher.on_safe(&mut self.timers) {
                self.emit(SessionEvent::PopupHidden);
            }
            return;
        }

        match self
            .dispatcher
            .on_level_change(new_level, now, &mut self.timers)
        {
            DispatchOutcome::Fired => {
                self.stats.alerts_fired += 1;
                self.emit(SessionEvent::AlertFired { level: new_level });
            }
            DispatchOutcome::CoolingDown | DispatchOutcome::Suppressed => {
                self.stats.fires_blocked += 1;
            }
            DispatchOutcome::NotAlerting => {}
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Events and accessors
    // ───────────────────────────────────────────────────────────────────────────

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        self.events.push(event);
    }

    /// Open a channel carrying every future event. Dropped receivers
    /// are detached on the next emit.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Take the buffered events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn level(&self) -> AlertLevel {
        self.level
    }

    pub fn is_safe(&self, kind: SensorKind) -> bool {
        self.safety.get(&kind).copied().unwrap_or(true)
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn popup_visible(&self) -> bool {
        self.dispatcher.popup_visible()
    }

    /// Earliest pending timer, for host sleep sizing.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED SESSION — For multi-threaded hosts
// ═══════════════════════════════════════════════════════════════════════════════

/// A session behind one mutex. Ingest thread, tick thread and UI
/// thread all serialize through it; the session itself never knows.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<MonitorSession>>,
}

impl SharedSession {
    pub fn new(session: MonitorSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, MonitorSession> {
        self.inner.lock()
    }
}

//! ═══════════════════════════════════════════════════════════════════════════════
//! TYPES — Sensor Identities, Readings, Thresholds, Time
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! The data spine shared by every module:
//! - SensorKind: the closed set of monitored channels (wire ids 1..=5)
//! - SensorReading: one timestamped sample
//! - Threshold / ThresholdTable: per-sensor safe ranges with infant defaults
//! - TimePoint: dual clock (monotonic for intervals, wall for records)
//! ═══════════════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// SENSOR KIND — Closed enum over the monitored channels
// ═══════════════════════════════════════════════════════════════════════════════

/// The five monitored sensor channels. Wire ids outside this set are
/// rejected at the ingest boundary; nothing downstream handles an
/// "unknown" sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Sound,
    Motion,
    Weight,
}

impl SensorKind {
    /// All kinds, in wire-id order.
    pub const ALL: [SensorKind; 5] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Sound,
        SensorKind::Motion,
        SensorKind::Weight,
    ];

    /// Map a firmware wire id to a kind. Ids outside 1..=5 are not monitored.
    pub fn from_wire_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(SensorKind::Temperature),
            2 => Some(SensorKind::Humidity),
            3 => Some(SensorKind::Sound),
            4 => Some(SensorKind::Motion),
            5 => Some(SensorKind::Weight),
            _ => None,
        }
    }

    pub fn wire_id(&self) -> u32 {
        match self {
            SensorKind::Temperature => 1,
            SensorKind::Humidity => 2,
            SensorKind::Sound => 3,
            SensorKind::Motion => 4,
            SensorKind::Weight => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Humidity => "Humidity",
            SensorKind::Sound => "Sound",
            SensorKind::Motion => "Motion",
            SensorKind::Weight => "Weight",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Humidity => "%",
            SensorKind::Sound => "dB",
            SensorKind::Motion => "",
            SensorKind::Weight => "kg",
        }
    }

    /// Direct distress indicators. Temperature and humidity are
    /// environmental context by contrast.
    pub fn is_priority(&self) -> bool {
        matches!(
            self,
            SensorKind::Sound | SensorKind::Motion | SensorKind::Weight
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIME POINT — Monotonic + wall clock pair
// ═══════════════════════════════════════════════════════════════════════════════

/// A point in time carrying both clocks. Interval math (cooldowns,
/// sustain windows, decay) uses the monotonic half exclusively; the
/// wall half exists for history records and push correlation.
#[derive(Debug, Clone, Copy)]
pub struct TimePoint {
    pub mono: Instant,
    pub wall: SystemTime,
}

impl TimePoint {
    pub fn now() -> Self {
        Self {
            mono: Instant::now(),
            wall: SystemTime::now(),
        }
    }

    /// Build from explicit clocks. Tests drive synthetic timelines this way.
    pub fn from_parts(mono: Instant, wall: SystemTime) -> Self {
        Self { mono, wall }
    }

    pub fn elapsed(&self) -> Duration {
        self.mono.elapsed()
    }

    pub fn unix_millis(&self) -> u64 {
        self.wall
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SENSOR READING — One sample
// ═══════════════════════════════════════════════════════════════════════════════

/// One timestamped sample from one channel. Ephemeral: only the weight
/// filter keeps a bounded history of these values.
#[derive(Debug, Clone, Copy)]
pub struct SensorReading {
    pub kind: SensorKind,
    pub value: f64,
    pub at: TimePoint,
}

impl SensorReading {
    pub fn new(kind: SensorKind, value: f64, at: TimePoint) -> Self {
        Self { kind, value, at }
    }

    pub fn now(kind: SensorKind, value: f64) -> Self {
        Self::new(kind, value, TimePoint::now())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// THRESHOLDS — Per-sensor safe ranges
// ═══════════════════════════════════════════════════════════════════════════════

/// A min/max pair whose interpretation depends on the sensor:
/// - Temperature: `max` is the alerting ceiling
/// - Humidity: safe band is `[min, max]`
/// - Sound: `max` is the detection level in dB; `min` doubles as the
///   consecutive-confirmation count in strict mode
/// - Motion: `min` is the intensity trigger, `max` the sustain seconds
/// - Weight: `min` is the sudden-drop delta, `max` the max inter-sample delta
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub min: f64,
    pub max: f64,
}

impl Threshold {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// One threshold per sensor kind, replaced in place on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdTable {
    entries: HashMap<SensorKind, Threshold>,
}

impl ThresholdTable {
    /// No entries. Every evaluation is skipped until thresholds arrive.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The defaults the client seeds before any server sync:
    /// temp 26-28°C, humidity 40-60%, sound 70 dB, motion trigger 1.5
    /// sustained 5 s, weight drop 1.0 kg / rate 0.5 kg.
    pub fn infant_defaults() -> Self {
        let mut entries = HashMap::new();
        entries.insert(SensorKind::Temperature, Threshold::new(26.0, 28.0));
        entries.insert(SensorKind::Humidity, Threshold::new(40.0, 60.0));
        entries.insert(SensorKind::Sound, Threshold::new(0.0, 70.0));
        entries.insert(SensorKind::Motion, Threshold::new(1.5, 5.0));
        entries.insert(SensorKind::Weight, Threshold::new(1.0, 0.5));
        Self { entries }
    }

    pub fn get(&self, kind: SensorKind) -> Option<&Threshold> {
        self.entries.get(&kind)
    }

    /// Insert or replace the entry for a kind.
    pub fn set(&mut self, kind: SensorKind, threshold: Threshold) {
        self.entries.insert(kind, threshold);
    }

    pub fn remove(&mut self, kind: SensorKind) -> Option<Threshold> {
        self.entries.remove(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

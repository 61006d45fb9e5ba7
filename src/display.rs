//! ═══════════════════════════════════════════════════════════════════════════════
//! DISPLAY — Formatted Readouts with Per-Sensor Throttling
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! The dashboard side of the pipeline. Fast channels (sound, weight)
//! update more often than a screen should repaint, so the board keeps
//! the last shown value per sensor and refuses updates inside the
//! throttle window. Formatting only; no safety logic lives here.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::SensorKind;

/// Render one value the way the dashboard shows it.
pub fn format_value(kind: SensorKind, value: f64) -> String {
    match kind {
        SensorKind::Temperature => format!("{:.1}°C", value),
        SensorKind::Humidity => format!("{:.0}%", value),
        SensorKind::Sound => format!("{:.0} dB", value),
        SensorKind::Motion => format!("{:.1}", value),
        SensorKind::Weight => format!("{:.2} kg", value),
    }
}

/// Minimum gap between visible updates for a channel.
fn throttle_window(kind: SensorKind) -> Duration {
    match kind {
        SensorKind::Sound => Duration::from_secs(1),
        SensorKind::Weight => Duration::from_secs(2),
        _ => Duration::ZERO,
    }
}

/// Last-shown values, one slot per sensor.
#[derive(Debug, Default)]
pub struct DisplayBoard {
    shown: HashMap<SensorKind, String>,
    last_update: HashMap<SensorKind, Instant>,
}

impl DisplayBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a fresh value. Returns true if the board accepted it,
    /// false if the channel is still inside its throttle window.
    pub fn offer(&mut self, kind: SensorKind, value: f64, now: Instant) -> bool {
        if let Some(&last) = self.last_update.get(&kind) {
            if now.duration_since(last) < throttle_window(kind) {
                return false;
            }
        }
        self.shown.insert(kind, format_value(kind, value));
        self.last_update.insert(kind, now);
        true
    }

    /// What the dashboard currently shows for a sensor.
    pub fn shown(&self, kind: SensorKind) -> Option<&str> {
        self.shown.get(&kind).map(String::as_str)
    }
}

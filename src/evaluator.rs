//! ═══════════════════════════════════════════════════════════════════════════════
//! EVALUATOR — Per-Sensor Range Classification
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! Pure functions: one reading + one threshold in, safe/unsafe out.
//! Sound and motion are not range checks; their verdicts come from the
//! temporal filters, so this module returns None for them.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::types::{SensorKind, Threshold};

/// Classify a single reading against its threshold.
///
/// Returns `Some(safe)` for range-evaluated kinds, `None` for the
/// filter-owned kinds (sound, motion) and for the weight channel,
/// whose verdict depends on history (see the weight filter). The
/// simple-floor weight variant is exposed separately below.
pub fn evaluate_range(kind: SensorKind, value: f64, threshold: &Threshold) -> Option<bool> {
    match kind {
        SensorKind::Temperature => Some(value <= threshold.max),
        SensorKind::Humidity => Some(value >= threshold.min && value <= threshold.max),
        SensorKind::Sound | SensorKind::Motion | SensorKind::Weight => None,
    }
}

/// Plain-floor weight check: safe iff the reading has not fallen below
/// the configured minimum.
pub fn weight_floor_safe(value: f64, threshold: &Threshold) -> bool {
    value >= threshold.min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_ceiling() {
        let t = Threshold::new(26.0, 28.0);
        assert_eq!(evaluate_range(SensorKind::Temperature, 27.5, &t), Some(true));
        // Boundary is inclusive
        assert_eq!(evaluate_range(SensorKind::Temperature, 28.0, &t), Some(true));
        assert_eq!(evaluate_range(SensorKind::Temperature, 28.1, &t), Some(false));
        // The floor does not alert
        assert_eq!(evaluate_range(SensorKind::Temperature, 20.0, &t), Some(true));
    }

    #[test]
    fn test_humidity_band() {
        let t = Threshold::new(40.0, 60.0);
        assert_eq!(evaluate_range(SensorKind::Humidity, 45.0, &t), Some(true));
        assert_eq!(evaluate_range(SensorKind::Humidity, 40.0, &t), Some(true));
        assert_eq!(evaluate_range(SensorKind::Humidity, 60.0, &t), Some(true));
        assert_eq!(evaluate_range(SensorKind::Humidity, 39.9, &t), Some(false));
        assert_eq!(evaluate_range(SensorKind::Humidity, 60.1, &t), Some(false));
    }

    #[test]
    fn test_filter_owned_kinds_decline() {
        let t = Threshold::new(0.0, 70.0);
        assert_eq!(evaluate_range(SensorKind::Sound, 80.0, &t), None);
        assert_eq!(evaluate_range(SensorKind::Motion, 3.0, &t), None);
        assert_eq!(evaluate_range(SensorKind::Weight, 4.0, &t), None);
    }

    #[test]
    fn test_weight_floor() {
        let t = Threshold::new(3.0, 0.5);
        assert!(weight_floor_safe(3.0, &t));
        assert!(weight_floor_safe(4.2, &t));
        assert!(!weight_floor_safe(2.9, &t));
    }
}

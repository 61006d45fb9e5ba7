//! ═══════════════════════════════════════════════════════════════════════════════
//! LEVEL — Alert Severity and Escalation Strategies
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! Combines per-sensor verdicts into one ordinal level
//! (Safe → Minor → Moderate → Critical). Two strategies:
//! 1. UniformCount: every sensor votes equally
//! 2. PriorityWeighted: sound/motion/weight outrank the environment pair
//!
//! Aggregation is pure: same snapshot in, same level out, no side
//! effects. The session only re-aggregates when a verdict changed.
//! ═══════════════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::config::EscalationStrategy;
use crate::types::SensorKind;

// ═══════════════════════════════════════════════════════════════════════════════
// ALERT LEVEL — The unified output
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordinal alert severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// All monitored sensors within range
    #[default]
    Safe = 0,
    /// Environmental drift, worth a glance
    Minor = 1,
    /// Activity detected, alert the caregiver
    Moderate = 2,
    /// Multiple distress signals, check immediately
    Critical = 3,
}

impl AlertLevel {
    pub fn name(&self) -> &'static str {
        match self {
            AlertLevel::Safe => "Safe",
            AlertLevel::Minor => "Minor",
            AlertLevel::Moderate => "Moderate",
            AlertLevel::Critical => "Critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AlertLevel::Safe => "\x1b[32m",     // green
            AlertLevel::Minor => "\x1b[33m",    // yellow
            AlertLevel::Moderate => "\x1b[91m", // light red
            AlertLevel::Critical => "\x1b[31m", // red
        }
    }

    /// Only these levels reach the notification channels.
    pub fn is_alerting(&self) -> bool {
        *self >= AlertLevel::Moderate
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ESCALATION POLICY — Strategy seam
// ═══════════════════════════════════════════════════════════════════════════════

/// A stabilized per-sensor snapshot: the verdict of every sensor that
/// currently has a threshold. Sensors awaiting thresholds are absent.
pub type SafetySnapshot = [(SensorKind, bool)];

/// Turns a snapshot into one level. Implementations must be pure.
pub trait EscalationPolicy: Send {
    fn aggregate(&self, snapshot: &SafetySnapshot) -> AlertLevel;
    fn name(&self) -> &'static str;
}

/// Build the configured strategy.
pub fn policy_for(strategy: EscalationStrategy) -> Box<dyn EscalationPolicy> {
    match strategy {
        EscalationStrategy::UniformCount => Box::new(UniformCount),
        EscalationStrategy::PriorityWeighted => Box::new(PriorityWeighted),
    }
}

/// Every sensor votes equally: 0 unsafe → Safe, 1 → Minor,
/// 2 → Moderate, 3+ → Critical.
pub struct UniformCount;

impl EscalationPolicy for UniformCount {
    fn aggregate(&self, snapshot: &SafetySnapshot) -> AlertLevel {
        let unsafe_count = snapshot.iter().filter(|(_, safe)| !safe).count();
        match unsafe_count {
            0 => AlertLevel::Safe,
            1 => AlertLevel::Minor,
            2 => AlertLevel::Moderate,
            _ => AlertLevel::Critical,
        }
    }

    fn name(&self) -> &'static str {
        "uniform_count"
    }
}

/// Sound, motion and weight are direct distress signals; temperature
/// and humidity are context. Two distress signals at once is Critical,
/// one is Moderate, environment-only drift is Minor.
pub struct PriorityWeighted;

impl EscalationPolicy for PriorityWeighted {
    fn aggregate(&self, snapshot: &SafetySnapshot) -> AlertLevel {
        let priority_unsafe = snapshot
            .iter()
            .filter(|(kind, safe)| kind.is_priority() && !safe)
            .count();
        let env_unsafe = snapshot
            .iter()
            .filter(|(kind, safe)| !kind.is_priority() && !safe)
            .count();

        if priority_unsafe >= 2 {
            AlertLevel::Critical
        } else if priority_unsafe == 1 {
            AlertLevel::Moderate
        } else if env_unsafe > 0 {
            AlertLevel::Minor
        } else {
            AlertLevel::Safe
        }
    }

    fn name(&self) -> &'static str {
        "priority_weighted"
    }
}

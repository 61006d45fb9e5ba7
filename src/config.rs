//! ═══════════════════════════════════════════════════════════════════════════════
//! CONFIG — Tunable Monitoring Parameters
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! One struct, sensible defaults. Every timing constant the pipeline
//! uses lives here; nothing downstream hardcodes a window.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CribResult};

/// Which aggregation strategy turns per-sensor verdicts into one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStrategy {
    /// Count unsafe sensors uniformly: 0 safe, 1 minor, 2 moderate, 3+ critical
    #[default]
    UniformCount,
    /// Weight sound/motion/weight above the environmental pair
    PriorityWeighted,
}

/// How the weight channel is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Safe iff value >= threshold.min (plain floor)
    SimpleFloor,
    /// Unsafe on sudden drop (> threshold.min) or inter-sample jump
    /// (> threshold.max) against recent history
    #[default]
    DeltaVariance,
}

/// Monitoring parameters. `Default` carries the tuned constants; a host
/// can deserialize overrides from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Aggregation strategy
    pub strategy: EscalationStrategy,
    /// Weight channel policy
    pub weight_policy: WeightPolicy,
    /// Minimum gap between alert firings (ms)
    pub cooldown_ms: u64,
    /// Sound unsafe state decays back to safe after this long without
    /// a fresh detection (ms)
    pub sound_decay_ms: u64,
    /// Alert popup auto-hides after this long (ms)
    pub popup_auto_hide_ms: u64,
    /// User cancellation suppresses further alerts for this long (ms)
    pub cancel_suppression_ms: u64,
    /// Strict sound mode: require N consecutive detections
    /// (N read from the sound threshold's min field) before going unsafe
    pub strict_sound_confirmation: bool,
    /// Samples the weight filter retains
    pub weight_history_depth: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            strategy: EscalationStrategy::UniformCount,
            weight_policy: WeightPolicy::DeltaVariance,
            cooldown_ms: 5_000,
            sound_decay_ms: 5_000,
            popup_auto_hide_ms: 5_000,
            cancel_suppression_ms: 60_000,
            strict_sound_confirmation: false,
            weight_history_depth: 5,
        }
    }
}

impl MonitorConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn sound_decay(&self) -> Duration {
        Duration::from_millis(self.sound_decay_ms)
    }

    pub fn popup_auto_hide(&self) -> Duration {
        Duration::from_millis(self.popup_auto_hide_ms)
    }

    pub fn cancel_suppression(&self) -> Duration {
        Duration::from_millis(self.cancel_suppression_ms)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> CribResult<()> {
        if self.weight_history_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "weight_history_depth".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.sound_decay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sound_decay_ms".to_string(),
                message: "must be nonzero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.strategy, EscalationStrategy::UniformCount);
        assert_eq!(config.weight_policy, WeightPolicy::DeltaVariance);
        assert_eq!(config.cooldown(), Duration::from_secs(5));
        assert_eq!(config.cancel_suppression(), Duration::from_secs(60));
        assert_eq!(config.weight_history_depth, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override_from_json() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{"cooldown_ms": 10000, "strategy": "priority_weighted"}"#)
                .unwrap();
        assert_eq!(config.cooldown(), Duration::from_secs(10));
        assert_eq!(config.strategy, EscalationStrategy::PriorityWeighted);
        // Untouched fields keep defaults
        assert_eq!(config.sound_decay(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_zero_history() {
        let config = MonitorConfig {
            weight_history_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

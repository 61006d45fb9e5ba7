//! ═══════════════════════════════════════════════════════════════════════════════
//! CRIBWATCH — Baby Monitor Alerting Core
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! The client-side alerting pipeline for a crib monitor:
//! 1. Ingest loose wire events into typed readings
//! 2. Judge each reading against configurable thresholds
//! 3. Stabilize noisy channels through temporal filters
//! 4. Aggregate per-sensor verdicts into one alert level
//! 5. Drive cooldown-gated, cancellable notifications
//!
//! Key insight: a level that doesn't change notification behavior is
//! decorative. Everything here exists to decide when to wake a parent.
//! ═══════════════════════════════════════════════════════════════════════════════

// Clippy configuration - intentional style choices for this codebase
#![allow(clippy::new_without_default)] // Some types shouldn't have Default
#![allow(clippy::single_match)] // Sometimes clearer than if-let

// ═══════════════════════════════════════════════════════════════════════════════
// FOUNDATION MODULES — The spine (types, errors, configuration)
// ═══════════════════════════════════════════════════════════════════════════════

pub mod config;
pub mod error;
pub mod types;

// ═══════════════════════════════════════════════════════════════════════════════
// PIPELINE MODULES — Reading in, level out
// ═══════════════════════════════════════════════════════════════════════════════

pub mod evaluator;
pub mod filters;
pub mod ingest;
pub mod level;
pub mod timer;

// ═══════════════════════════════════════════════════════════════════════════════
// OUTBOUND MODULES — Notifications and presentation
// ═══════════════════════════════════════════════════════════════════════════════

pub mod dispatch;
pub mod display;
pub mod history;

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION — The single owner of mutable state
// ═══════════════════════════════════════════════════════════════════════════════

pub mod session;

// Re-export common error types
pub use error::{ConfigError, CribError, CribResult, IngestError, SinkError};

// Re-export core types
pub use config::{EscalationStrategy, MonitorConfig, WeightPolicy};
pub use dispatch::{
    AlertSink, ConsoleSink, DispatchOutcome, NotificationDispatcher, NullSink, PushNote,
};
pub use display::{format_value, DisplayBoard};
pub use filters::{MotionFilter, SoundFilter, WeightFilter};
pub use history::{group_by_day, DayGroup, HistoryEntry, REVIEW_LIMIT};
pub use ingest::{FeedEvent, RawReadingEvent, RawThresholdEvent, RawValue};
pub use level::{policy_for, AlertLevel, EscalationPolicy, PriorityWeighted, UniformCount};
pub use session::{MonitorSession, SessionEvent, SessionStats, SharedSession};
pub use timer::{TimerKind, TimerQueue};
pub use types::{SensorKind, SensorReading, Threshold, ThresholdTable, TimePoint};

//! ═══════════════════════════════════════════════════════════════════════════════
//! FILTERS — Temporal Stabilization for Noisy Channels
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! Raw sound, motion and weight samples are too jumpy to alert on
//! directly. Three filters sit between the wire and the aggregator:
//! - Motion: a breach must stand for the full sustain window
//! - Sound: a detection latches unsafe and decays back after quiet
//! - Weight: deltas against a short history, not absolute position
//!
//! Filters own their latches; deadlines live in the shared TimerQueue
//! so the session's tick drives all expiry in one place.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::WeightPolicy;
use crate::evaluator;
use crate::timer::{TimerKind, TimerQueue};
use crate::types::Threshold;

// ═══════════════════════════════════════════════════════════════════════════════
// MOTION — Sustained-breach filter
// ═══════════════════════════════════════════════════════════════════════════════

/// Motion goes unsafe only when intensity stays above the trigger for
/// the whole sustain window (`threshold.min` = trigger level,
/// `threshold.max` = sustain seconds). Any sample at or below the
/// trigger cancels the pending window and restores safe immediately,
/// so brief stirring never escalates.
#[derive(Debug, Default)]
pub struct MotionFilter {
    above_trigger: bool,
    latched_unsafe: bool,
}

impl MotionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample. Returns the current verdict (true = safe).
    pub fn on_sample(
        &mut self,
        value: f64,
        threshold: &Threshold,
        now: Instant,
        timers: &mut TimerQueue,
    ) -> bool {
        let trigger = threshold.min;
        if value > trigger {
            if !self.above_trigger {
                self.above_trigger = true;
                let sustain = Duration::from_secs_f64(threshold.max.max(0.0));
                timers.schedule(TimerKind::MotionSustain, now + sustain);
            }
            // Repeated breach samples must not refresh the window, or
            // a fast sensor would never let it elapse.
        } else {
            self.above_trigger = false;
            self.latched_unsafe = false;
            timers.cancel(TimerKind::MotionSustain);
        }
        !self.latched_unsafe
    }

    /// The sustain window elapsed. Returns the new verdict.
    pub fn on_sustain_elapsed(&mut self) -> bool {
        if self.above_trigger {
            self.latched_unsafe = true;
        }
        !self.latched_unsafe
    }

    pub fn is_breaching(&self) -> bool {
        self.above_trigger
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOUND — Detection latch with decay
// ═══════════════════════════════════════════════════════════════════════════════

/// A detection (`value > threshold.max` dB) latches unsafe and arms
/// the decay timer; each further detection refreshes it (debounce, not
/// accumulation). Quiet samples do not clear the latch, expiry does.
///
/// Strict mode requires N consecutive detections before latching
/// (N read from `threshold.min`, clamped to at least 1); a quiet
/// sample resets the run.
#[derive(Debug, Default)]
pub struct SoundFilter {
    consecutive_detections: u32,
    latched_unsafe: bool,
}

impl SoundFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample. Returns the current verdict (true = safe).
    pub fn on_sample(
        &mut self,
        value: f64,
        threshold: &Threshold,
        strict: bool,
        decay: Duration,
        now: Instant,
        timers: &mut TimerQueue,
    ) -> bool {
        let detected = value > threshold.max;
        if detected {
            self.consecutive_detections = self.consecutive_detections.saturating_add(1);
            let required = if strict {
                (threshold.min as u32).max(1)
            } else {
                1
            };
            if self.consecutive_detections >= required {
                self.latched_unsafe = true;
                timers.schedule(TimerKind::SoundDecay, now + decay);
            }
        } else {
            self.consecutive_detections = 0;
        }
        !self.latched_unsafe
    }

    /// The decay window elapsed without a fresh detection.
    pub fn on_decay_elapsed(&mut self) -> bool {
        self.latched_unsafe = false;
        self.consecutive_detections = 0;
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WEIGHT — Delta checks against bounded history
// ═══════════════════════════════════════════════════════════════════════════════

/// Judges each sample against the most recent retained one: unsafe on
/// a sudden drop greater than `threshold.min` or any jump greater than
/// `threshold.max` (both strictly greater). The history always
/// advances, safe or not, so one bad sample cannot poison the next
/// comparison forever.
#[derive(Debug)]
pub struct WeightFilter {
    history: VecDeque<f64>,
    depth: usize,
}

impl WeightFilter {
    pub fn new(depth: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(depth.max(1)),
            depth: depth.max(1),
        }
    }

    /// Feed one sample. Returns the verdict (true = safe).
    pub fn on_sample(&mut self, value: f64, threshold: &Threshold, policy: WeightPolicy) -> bool {
        let safe = match policy {
            WeightPolicy::SimpleFloor => evaluator::weight_floor_safe(value, threshold),
            WeightPolicy::DeltaVariance => match self.history.back() {
                // First sample has nothing to compare against
                None => true,
                Some(&prev) => {
                    let sudden_drop = (prev - value) > threshold.min;
                    let jump = (value - prev).abs() > threshold.max;
                    !(sudden_drop || jump)
                }
            },
        };

        self.history.push_back(value);
        while self.history.len() > self.depth {
            self.history.pop_front();
        }

        safe
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn last(&self) -> Option<f64> {
        self.history.back().copied()
    }
}

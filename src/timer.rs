//! ═══════════════════════════════════════════════════════════════════════════════
//! TIMER — Single-Threaded Cancellable Deadlines
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! The pipeline needs exactly three one-shot timers (motion sustain,
//! sound decay, popup auto-hide), at most one of each pending at a
//! time. Re-scheduling a kind replaces its pending deadline, which is
//! what gives the sound path its refresh-on-detection debounce. No
//! threads: the session polls `pop_due` from its tick.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::time::Instant;

/// The one-shot timers the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Motion breach has stood long enough to count
    MotionSustain,
    /// Sound unsafe state expires back to safe
    SoundDecay,
    /// Alert popup auto-hides
    PopupAutoHide,
}

/// A pending deadline.
#[derive(Debug, Clone, Copy)]
struct Entry {
    kind: TimerKind,
    deadline: Instant,
}

/// Poll-driven timer queue. At most one pending entry per kind.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer. A pending entry of the same kind is replaced, so
    /// scheduling doubles as refresh.
    pub fn schedule(&mut self, kind: TimerKind, deadline: Instant) {
        self.cancel(kind);
        self.entries.push(Entry { kind, deadline });
    }

    /// Disarm a timer. Idempotent: cancelling an absent kind is a no-op.
    pub fn cancel(&mut self, kind: TimerKind) {
        self.entries.retain(|e| e.kind != kind);
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.deadline)
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.deadline <= now {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.deadline);
        due.into_iter().map(|e| e.kind).collect()
    }

    /// Earliest pending deadline, if any. Hosts use this to size their
    /// sleep between ticks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

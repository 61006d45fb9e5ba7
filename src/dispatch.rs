//! ═══════════════════════════════════════════════════════════════════════════════
//! DISPATCH — Cooldown-Gated Notification Fan-Out
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! Owns the alert-side state: when the last alert fired, whether the
//! popup is showing, whether the user has silenced us. The actual
//! channels (sound, haptics, push) sit behind the AlertSink trait so
//! hosts plug in platform primitives and tests plug in recorders.
//!
//! A failing channel is logged and skipped; it never blocks the others.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::MonitorConfig;
use crate::error::SinkError;
use crate::level::AlertLevel;
use crate::timer::{TimerKind, TimerQueue};

// ═══════════════════════════════════════════════════════════════════════════════
// PUSH NOTE — Level-specific notification text
// ═══════════════════════════════════════════════════════════════════════════════

/// Title/body pair handed to the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNote {
    pub title: String,
    pub body: String,
}

impl PushNote {
    /// Text for the alerting levels. Safe and Minor never push.
    pub fn for_level(level: AlertLevel) -> Option<Self> {
        match level {
            AlertLevel::Critical => Some(Self {
                title: "Critical alert".to_string(),
                body: "Multiple warning signs detected. Check on your baby immediately.".to_string(),
            }),
            AlertLevel::Moderate => Some(Self {
                title: "Moderate alert".to_string(),
                body: "Unusual activity detected in the crib.".to_string(),
            }),
            AlertLevel::Safe | AlertLevel::Minor => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ALERT SINK — Platform channel seam
// ═══════════════════════════════════════════════════════════════════════════════

/// The three outbound channels. Implementations wrap platform
/// primitives; tests record calls.
pub trait AlertSink: Send {
    /// Play the alert tone. Failure is tolerated upstream.
    fn play_sound(&mut self, level: AlertLevel) -> Result<(), SinkError>;
    /// Vibration pulse.
    fn haptic_pulse(&mut self, level: AlertLevel);
    /// Deliver a push notification.
    fn push_note(&mut self, note: &PushNote) -> Result<(), SinkError>;
}

/// Swallows everything. Useful for headless evaluation.
#[derive(Debug, Default)]
pub struct NullSink;

impl AlertSink for NullSink {
    fn play_sound(&mut self, _level: AlertLevel) -> Result<(), SinkError> {
        Ok(())
    }

    fn haptic_pulse(&mut self, _level: AlertLevel) {}

    fn push_note(&mut self, _note: &PushNote) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Prints channel activity to stdout. The replay binary uses this.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl AlertSink for ConsoleSink {
    fn play_sound(&mut self, level: AlertLevel) -> Result<(), SinkError> {
        println!("  [sound] alert tone ({})", level.name());
        Ok(())
    }

    fn haptic_pulse(&mut self, level: AlertLevel) {
        println!("  [haptic] pulse ({})", level.name());
    }

    fn push_note(&mut self, note: &PushNote) -> Result<(), SinkError> {
        println!("  [push] {}: {}", note.title, note.body);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISPATCHER — Gating and fan-out
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a level change did or did not reach the channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Channels invoked, popup shown
    Fired,
    /// Level below Moderate
    NotAlerting,
    /// Inside the cooldown window
    CoolingDown,
    /// Inside a user suppression window
    Suppressed,
}

/// Gates alert delivery behind cooldown and suppression, tracks the
/// popup, and fans out to the sink.
pub struct NotificationDispatcher {
    sink: Box<dyn AlertSink>,
    cooldown: Duration,
    auto_hide: Duration,
    suppression: Duration,
    last_fired_at: Option<Instant>,
    popup_visible: bool,
    suppressed_until: Option<Instant>,
}

impl NotificationDispatcher {
    pub fn new(config: &MonitorConfig, sink: Box<dyn AlertSink>) -> Self {
        Self {
            sink,
            cooldown: config.cooldown(),
            auto_hide: config.popup_auto_hide(),
            suppression: config.cancel_suppression(),
            last_fired_at: None,
            popup_visible: false,
            suppressed_until: None,
        }
    }

    /// React to an escalation. Only Moderate and Critical can fire,
    /// and only outside the cooldown and suppression windows.
    pub fn on_level_change(
        &mut self,
        level: AlertLevel,
        now: Instant,
        timers: &mut TimerQueue,
    ) -> DispatchOutcome {
        if !level.is_alerting() {
            return DispatchOutcome::NotAlerting;
        }
        if self.is_suppressed(now) {
            return DispatchOutcome::Suppressed;
        }
        if let Some(last) = self.last_fired_at {
            if now.duration_since(last) <= self.cooldown {
                return DispatchOutcome::CoolingDown;
            }
        }

        self.last_fired_at = Some(now);
        self.popup_visible = true;
        // One popup timer; a new fire replaces the pending hide
        timers.schedule(TimerKind::PopupAutoHide, now + self.auto_hide);

        if let Err(e) = self.sink.play_sound(level) {
            warn!(error = %e, "alert sound failed, continuing with remaining channels");
        }
        self.sink.haptic_pulse(level);
        if let Some(note) = PushNote::for_level(level) {
            if let Err(e) = self.sink.push_note(&note) {
                warn!(error = %e, "push notification failed");
            }
        }

        DispatchOutcome::Fired
    }

    /// Everything is back in range: hide the popup and clear the
    /// cooldown clock so the next escalation fires immediately.
    /// Returns true if a popup was actually hidden.
    pub fn on_safe(&mut self, timers: &mut TimerQueue) -> bool {
        self.last_fired_at = None;
        timers.cancel(TimerKind::PopupAutoHide);
        std::mem::take(&mut self.popup_visible)
    }

    /// User pressed cancel: hide the popup and open the suppression
    /// window. Returns true if a popup was hidden.
    pub fn cancel(&mut self, now: Instant, timers: &mut TimerQueue) -> bool {
        self.suppressed_until = Some(now + self.suppression);
        timers.cancel(TimerKind::PopupAutoHide);
        std::mem::take(&mut self.popup_visible)
    }

    /// The popup timer elapsed.
    pub fn on_auto_hide_elapsed(&mut self) -> bool {
        std::mem::take(&mut self.popup_visible)
    }

    pub fn popup_visible(&self) -> bool {
        self.popup_visible
    }

    pub fn last_fired_at(&self) -> Option<Instant> {
        self.last_fired_at
    }

    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.suppressed_until.is_some_and(|until| now < until)
    }
}

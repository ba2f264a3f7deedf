//! Cadence engine for the three time-gated side effects.
//!
//! The control loop runs at ~1 Hz but alarms, persistence records and
//! diagnostic dumps each have their own cadence.  The scheduler answers
//! "is it due?" from the timestamps kept in [`AlertState`], and moves a
//! timestamp forward only after the caller has acted on it.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Cadence gates                         │
//! │                                                              │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐  │
//! │  │ Alarm          │  │ Persist        │  │ Diagnostic     │  │
//! │  │ changed &&     │  │ elapsed >=     │  │ elapsed >=     │  │
//! │  │ level>Normal &&│  │ persist_ms     │  │ diagnostic_ms  │  │
//! │  │ elapsed > cool │  │                │  │                │  │
//! │  └───────┬────────┘  └───────┬────────┘  └───────┬────────┘  │
//! │          │                   │                   │           │
//! │          ▼                   ▼                   ▼           │
//! │   dispatcher.play     record → store       log snapshot      │
//! │          │                   │                   │           │
//! │          └──── mark_*(now) ──┴───────────────────┘           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic is `saturating_sub` on a monotonic `u64` millisecond
//! clock, so a timestamp that is (somehow) ahead of `now` reads as "no time
//! has passed" rather than wrapping.

use log::debug;

use crate::config::MonitorConfig;
use crate::monitor::context::{AlertState, Millis};
use crate::monitor::{AlertLevel, Transition};

// ═══════════════════════════════════════════════════════════════
//  Primitive
// ═══════════════════════════════════════════════════════════════

/// Milliseconds elapsed between `last` and `now`, clamped at zero.
pub fn elapsed_since(now: Millis, last: Millis) -> Millis {
    now.saturating_sub(last)
}

/// The shared gate contract: true once `interval` has elapsed since
/// `last_fire`.  The caller resets `last_fire = now` after acting.
pub fn due_since(last_fire: Millis, interval: Millis, now: Millis) -> bool {
    elapsed_since(now, last_fire) >= interval
}

/// Which side effects are due this cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueSet {
    pub alarm: bool,
    pub persist: bool,
    pub diagnostic: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Cadence gates, parameterised by the configured intervals.
///
/// Stateless apart from its configuration: every timestamp lives in the
/// [`AlertState`] passed in by the caller.
#[derive(Debug, Clone, Copy)]
pub struct CadenceScheduler {
    alarm_cooldown_ms: Millis,
    persist_interval_ms: Millis,
    diagnostic_interval_ms: Millis,
}

impl CadenceScheduler {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            alarm_cooldown_ms: config.alarm_cooldown_ms,
            persist_interval_ms: config.persist_interval_ms,
            diagnostic_interval_ms: config.diagnostic_interval_ms,
        }
    }

    /// An alarm is due only on a change *into* Attention or Critical, and
    /// only once the cooldown has strictly elapsed since the last alarm.
    pub fn alarm_due(&self, transition: &Transition, state: &AlertState, now: Millis) -> bool {
        transition.changed
            && transition.to > AlertLevel::Normal
            && elapsed_since(now, state.last_alarm_fire) > self.alarm_cooldown_ms
    }

    /// A persistence record is due once the interval has elapsed.
    pub fn persist_due(&self, state: &AlertState, now: Millis) -> bool {
        due_since(state.last_persist, self.persist_interval_ms, now)
    }

    /// A diagnostic dump is due once the interval has elapsed.
    pub fn diagnostic_due(&self, state: &AlertState, now: Millis) -> bool {
        due_since(state.last_diagnostic, self.diagnostic_interval_ms, now)
    }

    /// Evaluate all three gates against the same `state`, before any
    /// `mark_*` call moves a timer.
    pub fn poll(&self, transition: &Transition, state: &AlertState, now: Millis) -> DueSet {
        DueSet {
            alarm: self.alarm_due(transition, state, now),
            persist: self.persist_due(state, now),
            diagnostic: self.diagnostic_due(state, now),
        }
    }

    /// Record that the alarm was dispatched at `now`.
    pub fn mark_alarm(&self, state: &mut AlertState, now: Millis) {
        state.last_alarm_fire = now;
        debug!("Cadence: alarm timer reset at {} ms", now);
    }

    /// Record that a persistence attempt ran at `now` (successful or not).
    pub fn mark_persist(&self, state: &mut AlertState, now: Millis) {
        state.last_persist = now;
        debug!("Cadence: persist timer reset at {} ms", now);
    }

    /// Record that diagnostics were emitted at `now`.
    pub fn mark_diagnostic(&self, state: &mut AlertState, now: Millis) {
        state.last_diagnostic = now;
    }

    /// Milliseconds of alarm cooldown still in force.
    pub fn cooldown_remaining(&self, state: &AlertState, now: Millis) -> Millis {
        (self.alarm_cooldown_ms + 1).saturating_sub(elapsed_since(now, state.last_alarm_fire))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

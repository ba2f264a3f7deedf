//! Alert levels and the transition detector.
//!
//! ```text
//!            ┌──────────┐   classify()   ┌────────────────────┐
//!  snapshot ─▶ Risk     ├───────────────▶ AlertStateMachine   │
//!            │ Classifier│   AlertLevel   │  update(level, now)│──▶ Transition
//!            └──────────┘                └─────────┬──────────┘
//!                                                  │ writes
//!                                                  ▼
//!                                          AlertState.current_level
//! ```
//!
//! The machine has no hidden states: every cycle it overwrites the current
//! level with the classifier's output and reports whether it changed.

pub mod context;

use context::{AlertState, Millis};
use log::info;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Alert level
// ---------------------------------------------------------------------------

/// Discrete flood-risk severity.  The ordering is meaningful:
/// `Critical > Attention > Normal`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum AlertLevel {
    #[default]
    Normal = 0,
    Attention = 1,
    Critical = 2,
}

impl AlertLevel {
    /// Numeric code used in persisted records.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`code`](Self::code).
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::Attention),
            2 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Upper-case name used in persisted records and the console.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Attention => "ATTENTION",
            Self::Critical => "CRITICAL",
        }
    }

    /// Any level that warrants an audible alarm.
    pub fn is_alarming(self) -> bool {
        self > Self::Normal
    }
}

impl core::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Transition detector
// ---------------------------------------------------------------------------

/// Result of one [`AlertStateMachine::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub changed: bool,
    pub from: AlertLevel,
    pub to: AlertLevel,
}

/// Writes the classifier output into [`AlertState`] and reports changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertStateMachine;

impl AlertStateMachine {
    pub const fn new() -> Self {
        Self
    }

    /// Record `new_level` as the current level.
    ///
    /// The write is unconditional so the state stays authoritative even
    /// when nothing changed.  `changed` is the sole trigger for the
    /// "level changed" announcement and the candidate trigger for an alarm.
    pub fn update(&self, state: &mut AlertState, new_level: AlertLevel, now: Millis) -> Transition {
        let from = state.current_level;
        let changed = new_level != from;

        state.current_level = new_level;
        if changed {
            state.level_since = now;
            info!("Alert level: {} -> {}", from, new_level);
        }

        Transition {
            changed,
            from,
            to: new_level,
        }
    }
}

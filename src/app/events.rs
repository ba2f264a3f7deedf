//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log, test recorder).

use crate::diagnostics::DiagnosticReport;
use crate::monitor::AlertLevel;
use crate::risk::RiskReason;

use super::ports::StorageError;

/// Structured events emitted by the decision core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial level).
    Started(AlertLevel),

    /// The classifier output differs from the previous cycle.
    LevelChanged {
        from: AlertLevel,
        to: AlertLevel,
        reason: Option<RiskReason>,
    },

    /// An alarm pattern was handed to the buzzer.
    AlarmFired { level: AlertLevel, pulses: usize },

    /// A level change wanted an alarm but the cooldown was still running.
    AlarmSuppressed {
        level: AlertLevel,
        cooldown_remaining_ms: u64,
    },

    /// A persistence record was written.
    RecordSaved { name: String, total: usize },

    /// A persistence write failed; the next interval retries.
    StorageFailed(StorageError),

    /// Newly raised sensor fault bits.
    FaultDetected(u8),

    /// Sensor fault bits that are no longer present.
    FaultCleared(u8),

    /// Periodic sensor dump.
    Diagnostic(DiagnosticReport),

    /// Humidity and temperature were both invalid and the cycle was
    /// skipped, holding the previous level.
    CycleSkipped { held: AlertLevel },
}

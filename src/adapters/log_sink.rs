//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`AppEvent`] as one
//! pipe-separated record to the `log` facade (UART on the device, the
//! fmt subscriber on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::SensorFault;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Comma-separated names of the fault bits set in `flags`.
fn fault_names(flags: u8) -> String {
    SensorFault::ALL
        .iter()
        .filter(|f| flags & f.mask() != 0)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(level) => {
                info!("START | level={}", level);
            }
            AppEvent::LevelChanged { from, to, reason } => match reason {
                Some(r) => info!("LEVEL | {} -> {} | {}", from, to, r),
                None => info!("LEVEL | {} -> {}", from, to),
            },
            AppEvent::AlarmFired { level, pulses } => {
                info!("ALARM | {} | {} pulses", level, pulses);
            }
            AppEvent::AlarmSuppressed {
                level,
                cooldown_remaining_ms,
            } => {
                info!(
                    "ALARM | {} suppressed | cooldown {} ms left",
                    level, cooldown_remaining_ms
                );
            }
            AppEvent::RecordSaved { name, total } => {
                info!("SAVE  | {} | {} stored", name, total);
            }
            AppEvent::StorageFailed(e) => {
                warn!("SAVE  | failed: {}", e);
            }
            AppEvent::FaultDetected(flags) => {
                warn!("FAULT | detected 0b{:03b} | {}", flags, fault_names(*flags));
            }
            AppEvent::FaultCleared(flags) => {
                info!("FAULT | cleared 0b{:03b} | {}", flags, fault_names(*flags));
            }
            AppEvent::Diagnostic(report) => {
                info!("DIAG  | {}", report);
            }
            AppEvent::CycleSkipped { held } => {
                warn!("SKIP  | hygrometer lost, holding {}", held);
            }
        }
    }
}

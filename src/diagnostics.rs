//! Runtime diagnostics.
//!
//! - [`DiagnosticReport`]: the periodic sensor dump gated by the cadence
//!   scheduler (every `diagnostic_interval_ms`).
//! - [`StatusReport`]: the answer to the console `STATUS` command.
//! - [`install_panic_handler`]: logs the panic reason and uptime before the
//!   default handler aborts.
//!
//! Heap figures are collected on demand; on the host they are synthetic so
//! simulation runs print the same layout as the device.

use core::fmt;

use crate::monitor::AlertLevel;
use crate::monitor::context::{Millis, SensorSnapshot};

/// Periodic sensor dump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticReport {
    pub uptime_ms: Millis,
    pub snapshot: SensorSnapshot,
    pub level: AlertLevel,
    /// [`SensorFault`](crate::error::SensorFault) bitmask.
    pub faults: u8,
}

impl DiagnosticReport {
    pub fn new(uptime_ms: Millis, snapshot: SensorSnapshot, level: AlertLevel) -> Self {
        Self {
            uptime_ms,
            snapshot,
            level,
            faults: snapshot.faults(),
        }
    }
}

/// Writes an optional reading, or `--` when the channel is invalid.
struct Reading(Option<f32>, u8);

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.*}", usize::from(self.1), v),
            None => f.write_str("--"),
        }
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.snapshot;
        write!(
            f,
            "t={}s temp={}C hum={}% water={}cm light={:.0}% motion={} level={} faults=0b{:03b}",
            self.uptime_ms / 1000,
            Reading(s.temperature_c, 1),
            Reading(s.humidity_pct, 1),
            Reading(s.water_distance_cm, 1),
            s.light_pct,
            if s.motion { "yes" } else { "no" },
            self.level,
            self.faults,
        )
    }
}

/// Console `STATUS` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub device_id: heapless::String<32>,
    pub uptime_secs: u64,
    pub level: AlertLevel,
    pub records: usize,
    pub storage: &'static str,
    pub heap_free: u32,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SYSTEM STATUS ===")?;
        writeln!(f, "Device: {}", self.device_id)?;
        writeln!(f, "Uptime: {} s", self.uptime_secs)?;
        writeln!(f, "Alert level: {}", self.level)?;
        writeln!(f, "Records saved: {}", self.records)?;
        writeln!(f, "Storage: {}", self.storage)?;
        write!(f, "Free heap: {} bytes", self.heap_free)
    }
}

/// Free heap in bytes.
#[cfg(target_os = "espidf")]
pub fn heap_free() -> u32 {
    // SAFETY: plain allocator statistics read.
    unsafe { esp_idf_svc::sys::esp_get_free_heap_size() }
}

/// Free heap in bytes (synthetic on the host: 300 KB).
#[cfg(not(target_os = "espidf"))]
pub fn heap_free() -> u32 {
    307_200
}

// ───────────────────────────────────────────────────────────────
// Panic handler
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the reason with the current uptime.
///
/// Call once during init, after logging is up.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let location = info
            .location()
            .map_or_else(|| String::from("?"), |l| format!("{}:{}", l.file(), l.line()));

        #[cfg(target_os = "espidf")]
        let uptime_ms = {
            // SAFETY: esp_timer_get_time is a counter read, safe in panic context.
            (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
        };
        #[cfg(not(target_os = "espidf"))]
        let uptime_ms = 0u64;

        log::error!("PANIC at {} ms ({}): {}", uptime_ms, location, reason);
    }));
}

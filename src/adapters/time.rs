//! Monotonic uptime clock.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` (µs since boot).
//! - **host**: `std::time::Instant` taken at construction.
//!
//! Every timestamp the decision core sees comes from here, so gate
//! arithmetic never has to deal with a clock that goes backwards.

use crate::monitor::context::Millis;
use crate::sensors::MicrosClock;

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn now_us(&self) -> u64 {
        // SAFETY: esp_timer is started by the IDF before app_main.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction.
    #[cfg(not(target_os = "espidf"))]
    pub fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub fn now_ms(&self) -> Millis {
        self.now_us() / 1_000
    }

    pub fn uptime_secs(&self) -> u64 {
        self.now_us() / 1_000_000
    }
}

impl MicrosClock for MonotonicClock {
    fn micros(&self) -> u64 {
        self.now_us()
    }
}

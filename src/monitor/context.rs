//! Per-cycle sensor data and the long-lived alert state.
//!
//! `AlertState` is the single piece of mutable state that survives from one
//! cycle to the next.  It is owned by the control loop and lent to the
//! state machine and the cadence scheduler each cycle; nothing else holds
//! it, so no locking is needed.

use crate::error::SensorFault;

use super::AlertLevel;

/// Milliseconds on the monotonic uptime clock.
pub type Millis = u64;

// ---------------------------------------------------------------------------
// Sensor snapshot (immutable, one per cycle)
// ---------------------------------------------------------------------------

/// One cycle's readings.  `None` marks an invalid channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorSnapshot {
    /// Distance from the ultrasonic ranger to the water surface (cm).
    pub water_distance_cm: Option<f32>,
    /// Relative humidity (%).
    pub humidity_pct: Option<f32>,
    /// Air temperature (°C).
    pub temperature_c: Option<f32>,
    /// Ambient light (0–100 %).  Always readable.
    pub light_pct: f32,
    /// PIR motion output.  Always readable.
    pub motion: bool,
}

impl SensorSnapshot {
    /// Build a snapshot from raw driver outputs, mapping sentinels to `None`:
    /// a water distance `<= 0` means "no echo", NaN humidity/temperature
    /// means "sensor fault".
    pub fn from_raw(
        water_distance_cm: f32,
        humidity_pct: f32,
        temperature_c: f32,
        light_pct: f32,
        motion: bool,
    ) -> Self {
        Self {
            water_distance_cm: (water_distance_cm > 0.0).then_some(water_distance_cm),
            humidity_pct: (!humidity_pct.is_nan()).then_some(humidity_pct),
            temperature_c: (!temperature_c.is_nan()).then_some(temperature_c),
            light_pct,
            motion,
        }
    }

    /// Water distance, only if it is a real echo (strictly positive).
    pub fn valid_water_cm(&self) -> Option<f32> {
        self.water_distance_cm.filter(|d| *d > 0.0)
    }

    /// Humidity, only if it is a real number.
    pub fn valid_humidity(&self) -> Option<f32> {
        self.humidity_pct.filter(|h| !h.is_nan())
    }

    /// Temperature, only if it is a real number.
    pub fn valid_temperature(&self) -> Option<f32> {
        self.temperature_c.filter(|t| !t.is_nan())
    }

    /// Fault bitmask (see [`SensorFault::mask`]).
    pub fn faults(&self) -> u8 {
        let mut flags = 0;
        if self.valid_water_cm().is_none() {
            flags |= SensorFault::WaterNoEcho.mask();
        }
        if self.valid_humidity().is_none() {
            flags |= SensorFault::HumidityInvalid.mask();
        }
        if self.valid_temperature().is_none() {
            flags |= SensorFault::TemperatureInvalid.mask();
        }
        flags
    }

    /// True when humidity and temperature are both unusable.
    pub fn hygrometer_lost(&self) -> bool {
        self.faults() & SensorFault::COMPOSITE == SensorFault::COMPOSITE
    }
}

// ---------------------------------------------------------------------------
// Alert state (mutable, process lifetime)
// ---------------------------------------------------------------------------

/// The state carried between cycles.
///
/// `current_level` is only ever written by the state machine with the
/// latest classifier output; the three timestamps are only ever written by
/// the cadence scheduler after the corresponding side effect ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertState {
    pub current_level: AlertLevel,
    /// Uptime at which `current_level` was last entered.
    pub level_since: Millis,
    pub last_alarm_fire: Millis,
    pub last_persist: Millis,
    pub last_diagnostic: Millis,
}

impl AlertState {
    /// Boot state: Normal, all timers at the epoch.
    pub const fn new() -> Self {
        Self {
            current_level: AlertLevel::Normal,
            level_since: 0,
            last_alarm_fire: 0,
            last_persist: 0,
            last_diagnostic: 0,
        }
    }
}

impl Default for AlertState {
    fn default() -> Self {
        Self::new()
    }
}

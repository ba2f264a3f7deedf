//! Monitor configuration parameters
//!
//! All tunable parameters for the flood monitor: classification thresholds,
//! side-effect cadences, device identity and the storage backend.
//! Values can be overridden by a persisted config blob (see
//! [`ConfigPort`](crate::app::ports::ConfigPort)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Fixed-capacity device identifier carried into every persisted record.
pub type DeviceId = heapless::String<32>;

/// Where persistence records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// Keep recent records in RAM and echo them to the console log.
    Memory,
    /// Write one JSON file per record under `storage_root`.
    Flash,
}

/// What to do with a cycle whose humidity *and* temperature are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeFaultPolicy {
    /// Classify using the channels that are still valid.
    Evaluate,
    /// Skip the whole cycle and keep the previous alert level.
    HoldLastLevel,
}

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Identity ---
    pub device_id: DeviceId,

    // --- Classification thresholds ---
    /// Water at or closer than this distance (cm) → Critical.
    pub water_critical_cm: f32,
    /// Water at or closer than this distance (cm) → Attention.
    pub water_alert_cm: f32,
    /// Humidity (%) that, together with darkness, signals a storm.
    pub humidity_storm_pct: f32,
    /// Humidity (%) that alone raises Attention.
    pub humidity_alert_pct: f32,
    /// Ambient light (%) at or below which the sky is "dark".
    pub light_storm_pct: f32,
    /// Temperature (°C) at or above which readings are anomalous.
    pub temperature_anomaly_c: f32,

    // --- Cadence ---
    /// Minimum gap between two audible alarms (ms).
    pub alarm_cooldown_ms: u64,
    /// Persistence record interval (ms).
    pub persist_interval_ms: u64,
    /// Diagnostic sensor dump interval (ms).
    pub diagnostic_interval_ms: u64,
    /// Inter-cycle delay of the control loop (ms).
    pub control_loop_interval_ms: u32,

    // --- Storage ---
    pub storage_mode: StorageMode,
    pub storage_root: heapless::String<64>,
    /// Records retained by the storage backend before pruning.
    pub max_records: u16,

    // --- Degraded operation ---
    pub composite_fault_policy: CompositeFaultPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_id: fixed_str("flood_monitor_01"),

            water_critical_cm: 15.0,
            water_alert_cm: 30.0,
            humidity_storm_pct: 90.0,
            humidity_alert_pct: 85.0,
            light_storm_pct: 10.0,
            temperature_anomaly_c: 35.0,

            alarm_cooldown_ms: 10_000,
            persist_interval_ms: 30_000,
            diagnostic_interval_ms: 5_000,
            control_loop_interval_ms: 1_000, // 1 Hz

            storage_mode: StorageMode::Memory,
            storage_root: fixed_str(DEFAULT_STORAGE_ROOT),
            max_records: 50,

            composite_fault_policy: CompositeFaultPolicy::Evaluate,
        }
    }
}

#[cfg(target_os = "espidf")]
const DEFAULT_STORAGE_ROOT: &str = "/spiffs";
#[cfg(not(target_os = "espidf"))]
const DEFAULT_STORAGE_ROOT: &str = "./floodwatch-data";

impl MonitorConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.is_empty() {
            return Err(ConfigError::ValidationFailed("device_id must not be empty"));
        }
        if !(1.0..=400.0).contains(&self.water_critical_cm) {
            return Err(ConfigError::ValidationFailed(
                "water_critical_cm must be 1.0–400.0",
            ));
        }
        if !(1.0..=400.0).contains(&self.water_alert_cm) {
            return Err(ConfigError::ValidationFailed(
                "water_alert_cm must be 1.0–400.0",
            ));
        }
        if self.water_critical_cm >= self.water_alert_cm {
            return Err(ConfigError::ValidationFailed(
                "water_critical_cm must be below water_alert_cm",
            ));
        }
        if !(0.0..=100.0).contains(&self.humidity_storm_pct)
            || !(0.0..=100.0).contains(&self.humidity_alert_pct)
        {
            return Err(ConfigError::ValidationFailed(
                "humidity thresholds must be 0–100%",
            ));
        }
        if self.humidity_alert_pct > self.humidity_storm_pct {
            return Err(ConfigError::ValidationFailed(
                "humidity_alert_pct must not exceed humidity_storm_pct",
            ));
        }
        if !(0.0..=100.0).contains(&self.light_storm_pct) {
            return Err(ConfigError::ValidationFailed("light_storm_pct must be 0–100%"));
        }
        if !(-40.0..=80.0).contains(&self.temperature_anomaly_c) {
            return Err(ConfigError::ValidationFailed(
                "temperature_anomaly_c must be -40–80 °C",
            ));
        }
        if self.alarm_cooldown_ms == 0
            || self.persist_interval_ms == 0
            || self.diagnostic_interval_ms == 0
            || self.control_loop_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        if self.storage_root.is_empty() {
            return Err(ConfigError::ValidationFailed("storage_root must not be empty"));
        }
        if self.max_records == 0 {
            return Err(ConfigError::ValidationFailed("max_records must be at least 1"));
        }
        Ok(())
    }
}

/// Copy `s` into a fixed-capacity string, truncating on overflow.
pub fn fixed_str<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

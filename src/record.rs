//! Persistence record: the structured document handed to the record store.
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "device_id": "flood_monitor_01",
//!   "timestamp": 30000,
//!   "sensors":  { "temperature": 25.0, "humidity": 50.0,
//!                 "water_distance": 12.0, "light_level": 80.0,
//!                 "motion_detected": false },
//!   "status":   { "alert_level": 2, "alert_name": "CRITICAL" },
//!   "analysis": { "flood_risk": true, "evacuation_needed": true }
//! }
//! ```
//!
//! Invalid channels are passed through untouched and serialize as `null`.

use serde::{Deserialize, Serialize};

use crate::config::{DeviceId, fixed_str};
use crate::monitor::AlertLevel;
use crate::monitor::context::{Millis, SensorSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceRecord {
    pub device_id: DeviceId,
    pub timestamp: Millis,
    pub sensors: SensorSection,
    pub status: StatusSection,
    pub analysis: AnalysisSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSection {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub water_distance: Option<f32>,
    pub light_level: f32,
    pub motion_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSection {
    pub alert_level: u8,
    pub alert_name: heapless::String<16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub flood_risk: bool,
    pub evacuation_needed: bool,
}

impl PersistenceRecord {
    /// Assemble a record.  Pure: writing it out is the store's job.
    pub fn build(
        snapshot: &SensorSnapshot,
        level: AlertLevel,
        device_id: &str,
        now: Millis,
    ) -> Self {
        Self {
            device_id: fixed_str(device_id),
            timestamp: now,
            sensors: SensorSection {
                temperature: snapshot.temperature_c,
                humidity: snapshot.humidity_pct,
                water_distance: snapshot.water_distance_cm,
                light_level: snapshot.light_pct,
                motion_detected: snapshot.motion,
            },
            status: StatusSection {
                alert_level: level.code(),
                alert_name: fixed_str(level.name()),
            },
            analysis: AnalysisSection {
                flood_risk: level >= AlertLevel::Attention,
                evacuation_needed: level == AlertLevel::Critical,
            },
        }
    }

    /// The level recorded in `status`, if the code is known.
    pub fn level(&self) -> Option<AlertLevel> {
        AlertLevel::from_code(self.status.alert_level)
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

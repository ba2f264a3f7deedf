//! Flood-risk classification.
//!
//! Maps one [`SensorSnapshot`] to an [`AlertLevel`] with an ordered rule
//! table.  The first matching rule wins; the order is policy, so it is
//! kept in one place (`assess`) rather than spread over helpers.
//!
//! | # | Rule                                         | Level     |
//! |---|----------------------------------------------|-----------|
//! | 1 | water valid and `<= water_critical_cm`       | Critical  |
//! | 2 | humidity `>= humidity_storm_pct` and dark    | Critical  |
//! | 3 | water valid and `<= water_alert_cm`          | Attention |
//! | 4 | humidity `>= humidity_alert_pct`             | Attention |
//! | 5 | light `<= light_storm_pct`                   | Attention |
//! | 6 | temperature `>= temperature_anomaly_c`       | Attention |
//! | 7 | otherwise                                    | Normal    |
//!
//! An invalid channel never matches a rule; it is "no data", not "normal"
//! and not "alarm".

use log::debug;

use crate::config::MonitorConfig;
use crate::monitor::AlertLevel;
use crate::monitor::context::SensorSnapshot;

/// Which rule produced the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskReason {
    WaterCritical,
    StormSignature,
    WaterRising,
    HighHumidity,
    Darkness,
    HighTemperature,
}

impl RiskReason {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::WaterCritical => "water at critical distance",
            Self::StormSignature => "saturated air and darkness",
            Self::WaterRising => "water approaching",
            Self::HighHumidity => "high humidity",
            Self::Darkness => "sudden darkness",
            Self::HighTemperature => "temperature anomaly",
        }
    }
}

impl core::fmt::Display for RiskReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Classifier output: the level and, unless Normal, the rule that set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub level: AlertLevel,
    pub reason: Option<RiskReason>,
}

impl Assessment {
    const fn hit(level: AlertLevel, reason: RiskReason) -> Self {
        Self {
            level,
            reason: Some(reason),
        }
    }
}

/// Pure, total classifier over any snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier {
    water_critical_cm: f32,
    water_alert_cm: f32,
    humidity_storm_pct: f32,
    humidity_alert_pct: f32,
    light_storm_pct: f32,
    temperature_anomaly_c: f32,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}

impl RiskClassifier {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            water_critical_cm: config.water_critical_cm,
            water_alert_cm: config.water_alert_cm,
            humidity_storm_pct: config.humidity_storm_pct,
            humidity_alert_pct: config.humidity_alert_pct,
            light_storm_pct: config.light_storm_pct,
            temperature_anomaly_c: config.temperature_anomaly_c,
        }
    }

    /// Level only.
    pub fn classify(&self, snapshot: &SensorSnapshot) -> AlertLevel {
        self.assess(snapshot).level
    }

    /// Level plus the matching rule.  Boundaries are inclusive.
    pub fn assess(&self, snapshot: &SensorSnapshot) -> Assessment {
        let water = snapshot.valid_water_cm();
        let humidity = snapshot.valid_humidity();
        let temperature = snapshot.valid_temperature();
        let dark = snapshot.light_pct <= self.light_storm_pct;

        let assessment = if water.is_some_and(|d| d <= self.water_critical_cm) {
            Assessment::hit(AlertLevel::Critical, RiskReason::WaterCritical)
        } else if humidity.is_some_and(|h| h >= self.humidity_storm_pct) && dark {
            Assessment::hit(AlertLevel::Critical, RiskReason::StormSignature)
        } else if water.is_some_and(|d| d <= self.water_alert_cm) {
            Assessment::hit(AlertLevel::Attention, RiskReason::WaterRising)
        } else if humidity.is_some_and(|h| h >= self.humidity_alert_pct) {
            Assessment::hit(AlertLevel::Attention, RiskReason::HighHumidity)
        } else if dark {
            Assessment::hit(AlertLevel::Attention, RiskReason::Darkness)
        } else if temperature.is_some_and(|t| t >= self.temperature_anomaly_c) {
            Assessment::hit(AlertLevel::Attention, RiskReason::HighTemperature)
        } else {
            Assessment {
                level: AlertLevel::Normal,
                reason: None,
            }
        };

        if let Some(reason) = assessment.reason {
            debug!("Risk: {} ({})", assessment.level, reason);
        }
        assessment
    }
}

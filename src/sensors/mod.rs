//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! Each channel sits behind a one-method trait so the hub can be built from
//! real drivers on the device and from scripted fakes in tests.  The hub
//! produces one [`SensorSnapshot`] per cycle; a driver error becomes an
//! invalid channel, never a failed cycle.

pub mod dht;
pub mod light;
pub mod motion;
pub mod ultrasonic;

use log::debug;

use crate::error::SensorError;
use crate::monitor::context::SensorSnapshot;

/// Microsecond timestamp source used for pulse-width measurement.
pub trait MicrosClock {
    fn micros(&self) -> u64;
}

impl<C: MicrosClock + ?Sized> MicrosClock for &C {
    fn micros(&self) -> u64 {
        (**self).micros()
    }
}

/// Distance to the water surface.
pub trait RangeFinder {
    fn distance_cm(&mut self) -> Result<f32, SensorError>;
}

/// Humidity + temperature pair from one sensor transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HygroReading {
    pub humidity_pct: f32,
    pub temperature_c: f32,
}

pub trait Hygrometer {
    fn read(&mut self) -> Result<HygroReading, SensorError>;
}

/// Ambient light, 0–100 %.
pub trait LightMeter {
    fn light_pct(&mut self) -> f32;
}

pub trait MotionDetector {
    fn motion(&mut self) -> bool;
}

/// Aggregates all sensor drivers and produces a unified snapshot.
pub struct SensorHub<R, H, L, M> {
    pub range: R,
    pub hygrometer: H,
    pub light: L,
    pub motion: M,
}

impl<R, H, L, M> SensorHub<R, H, L, M>
where
    R: RangeFinder,
    H: Hygrometer,
    L: LightMeter,
    M: MotionDetector,
{
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(range: R, hygrometer: H, light: L, motion: M) -> Self {
        Self {
            range,
            hygrometer,
            light,
            motion,
        }
    }

    /// Read every sensor.  Failures are logged at debug level; fault
    /// reporting happens once per change in the service.
    pub fn read_snapshot(&mut self) -> SensorSnapshot {
        let water = self.range.distance_cm().unwrap_or_else(|e| {
            debug!("Ultrasonic: {}", e);
            -1.0
        });
        let (humidity, temperature) = match self.hygrometer.read() {
            Ok(r) => (r.humidity_pct, r.temperature_c),
            Err(e) => {
                debug!("DHT22: {}", e);
                (f32::NAN, f32::NAN)
            }
        };
        let light = self.light.light_pct();
        let motion = self.motion.motion();

        SensorSnapshot::from_raw(water, humidity, temperature, light, motion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRange(Result<f32, SensorError>);
    impl RangeFinder for FixedRange {
        fn distance_cm(&mut self) -> Result<f32, SensorError> {
            self.0
        }
    }

    struct FixedHygro(Result<HygroReading, SensorError>);
    impl Hygrometer for FixedHygro {
        fn read(&mut self) -> Result<HygroReading, SensorError> {
            self.0
        }
    }

    struct FixedLight(f32);
    impl LightMeter for FixedLight {
        fn light_pct(&mut self) -> f32 {
            self.0
        }
    }

    struct FixedMotion(bool);
    impl MotionDetector for FixedMotion {
        fn motion(&mut self) -> bool {
            self.0
        }
    }

    #[test]
    fn hub_combines_channels() {
        let mut hub = SensorHub::new(
            FixedRange(Ok(42.0)),
            FixedHygro(Ok(HygroReading {
                humidity_pct: 70.0,
                temperature_c: 22.5,
            })),
            FixedLight(60.0),
            FixedMotion(true),
        );
        let s = hub.read_snapshot();
        assert_eq!(s.water_distance_cm, Some(42.0));
        assert_eq!(s.humidity_pct, Some(70.0));
        assert_eq!(s.temperature_c, Some(22.5));
        assert!(s.motion);
    }

    #[test]
    fn driver_errors_become_invalid_channels() {
        let mut hub = SensorHub::new(
            FixedRange(Err(SensorError::Timeout)),
            FixedHygro(Err(SensorError::ChecksumMismatch)),
            FixedLight(60.0),
            FixedMotion(false),
        );
        let s = hub.read_snapshot();
        assert_eq!(s.water_distance_cm, None);
        assert_eq!(s.humidity_pct, None);
        assert_eq!(s.temperature_c, None);
        assert_eq!(s.faults(), 0b111);
    }
}

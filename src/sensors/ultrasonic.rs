//! HC-SR04 ultrasonic ranger, mounted above the water surface.
//!
//! A 10 µs trigger pulse starts a measurement; the echo line then stays
//! HIGH for the round-trip time of the sound burst.  Distance is
//! `width_us × 0.034 / 2` cm.  The whole measurement is bounded by a
//! 30 ms budget (≈5 m, past the sensor's rated range); running out of
//! budget is reported as [`SensorError::Timeout`].
//!
//! Generic over `embedded-hal` 1.0 pins and delay so the same driver runs
//! on `esp-idf-hal` `PinDriver`s and on test doubles.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::{MicrosClock, RangeFinder};
use crate::error::SensorError;

/// Speed of sound at ~20 °C, in cm per microsecond.
pub const SOUND_CM_PER_US: f32 = 0.034;
/// Maximum time to wait for the echo to start and finish.
pub const ECHO_TIMEOUT_US: u64 = 30_000;

/// Convert an echo pulse width to a one-way distance.
pub fn echo_to_cm(width_us: u64) -> f32 {
    width_us as f32 * SOUND_CM_PER_US / 2.0
}

pub struct Hcsr04<T, E, D, C> {
    trig: T,
    echo: E,
    delay: D,
    clock: C,
}

impl<T, E, D, C> Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: MicrosClock,
{
    pub fn new(trig: T, echo: E, delay: D, clock: C) -> Self {
        Self {
            trig,
            echo,
            delay,
            clock,
        }
    }

    /// Fire one ping and time the echo.
    pub fn measure(&mut self) -> Result<f32, SensorError> {
        self.trig.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(2);
        self.trig.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(10);
        self.trig.set_low().map_err(|_| SensorError::GpioFailed)?;

        let start = self.clock.micros();
        self.wait_for(true, start)?;
        let rise = self.clock.micros();
        self.wait_for(false, start)?;
        let fall = self.clock.micros();

        Ok(echo_to_cm(fall.saturating_sub(rise)))
    }

    fn wait_for(&mut self, high: bool, start: u64) -> Result<(), SensorError> {
        loop {
            if self.echo.is_high().map_err(|_| SensorError::GpioFailed)? == high {
                return Ok(());
            }
            if self.clock.micros().saturating_sub(start) > ECHO_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
    }
}

impl<T, E, D, C> RangeFinder for Hcsr04<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: MicrosClock,
{
    fn distance_cm(&mut self) -> Result<f32, SensorError> {
        self.measure()
    }
}

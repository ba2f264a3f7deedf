//! DHT22 (AM2302) humidity/temperature sensor, single-wire protocol.
//!
//! ```text
//!  host   ‾‾‾\______ 1.1 ms ______/‾‾ 30 µs ‾‾
//!  sensor                                  \_ 80 _/‾ 80 ‾\_ 50 _/‾ 27|70 ‾\_ ...
//!                                                         └─── 40 bits ───┘
//! ```
//!
//! Each bit is a ~50 µs LOW followed by a HIGH whose width encodes the
//! value: ~27 µs = 0, ~70 µs = 1.  The 5-byte frame is
//! `[hum_hi, hum_lo, temp_hi, temp_lo, checksum]`, values in tenths, sign
//! in the top bit of `temp_hi`.
//!
//! The sensor must not be polled faster than every 2 s; calls inside that
//! window return the previous result.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::{HygroReading, Hygrometer, MicrosClock};
use crate::error::SensorError;

/// Minimum time between two bus transactions.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 2_000;
/// Host start signal (datasheet: at least 1 ms).
const START_LOW_US: u32 = 1_100;
/// HIGH width separating a 0 bit from a 1 bit.
const BIT_THRESHOLD_US: u64 = 40;
/// Longest any single level is allowed to last before giving up.
const LEVEL_TIMEOUT_US: u64 = 100;

/// Decode and verify a raw 5-byte frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<HygroReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
    let temperature = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    if !(0.0..=100.0).contains(&humidity) || !(-40.0..=80.0).contains(&temperature) {
        return Err(SensorError::OutOfRange);
    }

    Ok(HygroReading {
        humidity_pct: humidity,
        temperature_c: temperature,
    })
}

/// DHT22 on one open-drain GPIO.
pub struct Dht22<P, D, C> {
    pin: P,
    delay: D,
    clock: C,
    last: Option<(u64, Result<HygroReading, SensorError>)>,
}

impl<P, D, C> Dht22<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: MicrosClock,
{
    pub fn new(pin: P, delay: D, clock: C) -> Self {
        Self {
            pin,
            delay,
            clock,
            last: None,
        }
    }

    fn transaction(&mut self) -> Result<HygroReading, SensorError> {
        // Start signal, then release the line to the pull-up.
        self.pin.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(30);

        // Sensor response: 80 µs LOW, 80 µs HIGH, then the first bit's LOW.
        self.wait_level(false)?;
        self.wait_level(true)?;
        self.wait_level(false)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_level(true)?;
            let rise = self.clock.micros();
            self.wait_level(false)?;
            let width = self.clock.micros().saturating_sub(rise);
            if width > BIT_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }

        decode_frame(frame)
    }

    fn wait_level(&mut self, high: bool) -> Result<(), SensorError> {
        let start = self.clock.micros();
        loop {
            if self.pin.is_high().map_err(|_| SensorError::GpioFailed)? == high {
                return Ok(());
            }
            if self.clock.micros().saturating_sub(start) > LEVEL_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
    }
}

impl<P, D, C> Hygrometer for Dht22<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: MicrosClock,
{
    fn read(&mut self) -> Result<HygroReading, SensorError> {
        let now_ms = self.clock.micros() / 1000;
        if let Some((at, result)) = self.last {
            if now_ms.saturating_sub(at) < MIN_SAMPLE_INTERVAL_MS {
                return result;
            }
        }
        let result = self.transaction();
        self.last = Some((now_ms, result));
        result
    }
}

//! Error types shared across the firmware.
//!
//! [`Error`] is what bootstrap code returns; driver-level failures keep
//! their own small enums ([`SensorError`], [`DisplayError`]) because the
//! control loop never propagates them.  All variants are `Copy` so they
//! can be passed around without allocation.
//!
//! Sensor problems are not errors at the decision layer: a bad channel
//! shows up as a [`SensorFault`] bit on the snapshot and the classifier
//! treats it as "no data".

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Failures that stop the firmware from starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A peripheral could not be configured; `code` is the ESP-IDF return
    /// code.
    Init { peripheral: &'static str, code: i32 },
    /// A path handed to the VFS contained a NUL byte.
    InvalidPath,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init { peripheral, code } => write!(f, "init: {peripheral} failed (rc={code})"),
            Self::InvalidPath => write!(f, "init: path contains NUL"),
        }
    }
}

impl core::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        let (peripheral, code) = match e {
            HwInitError::AdcInitFailed(rc) => ("ADC1", rc),
            HwInitError::LedcInitFailed(rc) => ("LEDC", rc),
            HwInitError::ConsoleInitFailed(rc) => ("console UART", rc),
            HwInitError::StorageMountFailed(rc) => ("SPIFFS", rc),
            HwInitError::InvalidMountPoint => return Self::InvalidPath,
        };
        Self::Init { peripheral, code }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No response edge arrived within the bounded wait.
    Timeout,
    /// DHT frame checksum did not match its payload.
    ChecksumMismatch,
    /// GPIO read or write returned an error.
    GpioFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "response timeout"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The I²C expander did not acknowledge a write.
    BusWrite,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusWrite => write!(f, "I2C write failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Per-channel fault bits derived from a [`SensorSnapshot`].
///
/// Faults are accumulated in a bitfield so that several simultaneous
/// channel failures can be reported (and cleared) independently.  They
/// are never escalated: the classifier simply ignores the affected rule.
///
/// [`SensorSnapshot`]: crate::monitor::context::SensorSnapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorFault {
    /// Ultrasonic ranger saw no echo (or timed out).
    WaterNoEcho = 0b0000_0001,
    /// Hygrometer humidity channel returned NaN.
    HumidityInvalid = 0b0000_0010,
    /// Hygrometer temperature channel returned NaN.
    TemperatureInvalid = 0b0000_0100,
}

impl SensorFault {
    pub const ALL: [Self; 3] = [
        Self::WaterNoEcho,
        Self::HumidityInvalid,
        Self::TemperatureInvalid,
    ];

    /// Bits set when the hygrometer lost both channels in one cycle.
    pub const COMPOSITE: u8 = Self::HumidityInvalid.mask() | Self::TemperatureInvalid.mask();

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaterNoEcho => write!(f, "water sensor: no echo"),
            Self::HumidityInvalid => write!(f, "humidity invalid"),
            Self::TemperatureInvalid => write!(f, "temperature invalid"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

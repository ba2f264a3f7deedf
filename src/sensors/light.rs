//! LDR ambient light sensor on ADC1.
//!
//! The photoresistor sits in a divider whose output rises with light.
//! A 12-bit reading maps linearly onto 0–100 %.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the oneshot ADC via [`hw_init::adc1_read`].
//! On host/test: reads a simulated raw value (defaults to daylight).

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use super::LightMeter;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_LDR_RAW: AtomicU16 = AtomicU16::new(3_000);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_raw(raw: u16) {
    SIM_LDR_RAW.store(raw.min(pins::ADC_FULL_SCALE), Ordering::Relaxed);
}

/// `raw / 4095 × 100`, clamped to the valid range.
pub fn raw_to_pct(raw: u16) -> f32 {
    f32::from(raw.min(pins::ADC_FULL_SCALE)) / f32::from(pins::ADC_FULL_SCALE) * 100.0
}

pub struct LdrSensor {
    #[cfg(target_os = "espidf")]
    channel: u32,
    last_raw: u16,
}

impl LdrSensor {
    /// `channel` is the ADC1 channel; the host build reads the simulated
    /// value instead.
    #[cfg_attr(not(target_os = "espidf"), allow(unused_variables))]
    pub fn new(channel: u32) -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            channel,
            last_raw: 0,
        }
    }

    /// Most recent raw ADC count.
    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self) -> u16 {
        SIM_LDR_RAW.load(Ordering::Relaxed)
    }
}

impl LightMeter for LdrSensor {
    fn light_pct(&mut self) -> f32 {
        self.last_raw = self.read_raw();
        raw_to_pct(self.last_raw)
    }
}

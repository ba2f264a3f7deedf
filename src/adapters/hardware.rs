//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the LCD, and forwards alarm requests to the
//! buzzer thread over [`BUZZER_CHANNEL`](crate::drivers::buzzer::BUZZER_CHANNEL).
//! Generic over the driver types so `main` builds it from `esp-idf-hal`
//! drivers and tests can build it from mocks.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::dispatch::{AlarmPattern, DisplayText};
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::buzzer::{self, BuzzerChannel, BuzzerMsg};
use crate::drivers::lcd::Lcd1602;
use crate::monitor::context::SensorSnapshot;
use crate::sensors::{Hygrometer, LightMeter, MotionDetector, RangeFinder, SensorHub};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<R, H, L, M, I2C, D> {
    sensor_hub: SensorHub<R, H, L, M>,
    lcd: Lcd1602<I2C, D>,
    buzzer: &'static BuzzerChannel,
    /// Last text that reached the display; identical frames are skipped.
    shown: Option<DisplayText>,
}

impl<R, H, L, M, I2C, D> HardwareAdapter<R, H, L, M, I2C, D> {
    pub fn new(
        sensor_hub: SensorHub<R, H, L, M>,
        lcd: Lcd1602<I2C, D>,
        buzzer: &'static BuzzerChannel,
    ) -> Self {
        Self {
            sensor_hub,
            lcd,
            buzzer,
            shown: None,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<R, H, L, M, I2C, D> SensorPort for HardwareAdapter<R, H, L, M, I2C, D>
where
    R: RangeFinder,
    H: Hygrometer,
    L: LightMeter,
    M: MotionDetector,
{
    fn read_snapshot(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_snapshot()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<R, H, L, M, I2C, D> ActuatorPort for HardwareAdapter<R, H, L, M, I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn show(&mut self, text: &DisplayText) {
        if self.shown.as_ref() == Some(text) {
            return;
        }
        match self.lcd.write_lines(&text.line1, &text.line2) {
            Ok(()) => self.shown = Some(text.clone()),
            Err(e) => {
                // Retry on the next cycle.
                warn!("LCD: {}", e);
                self.shown = None;
            }
        }
    }

    fn play_alarm(&mut self, pattern: AlarmPattern) {
        buzzer::request(self.buzzer, BuzzerMsg::Play(pattern));
    }

    fn silence(&mut self) {
        buzzer::request(self.buzzer, BuzzerMsg::Silence);
    }
}

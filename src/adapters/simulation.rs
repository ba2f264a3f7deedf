//! Host simulation of the monitor hardware.
//!
//! [`SimulatedHardware`] replays a scripted flood scenario one reading per
//! cycle and prints what the LCD would show.  Alarm requests go to the
//! buzzer thread exactly as on the device, where [`LogTone`] logs them.
//!
//! [`LogTone`]: crate::drivers::buzzer::LogTone

use log::info;

use crate::app::dispatch::{AlarmPattern, DisplayText};
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::buzzer::{self, BuzzerChannel, BuzzerMsg};
use crate::monitor::context::SensorSnapshot;

/// Cycles in one pass of the scenario; it loops afterwards.
pub const SCENARIO_CYCLES: u64 = 90;

/// Reading for `cycle` of the built-in scenario:
///
/// | cycles | phase                                  |
/// |--------|----------------------------------------|
/// | 0–14   | calm, dry, daylight                    |
/// | 15–29  | river rising from 120 cm to 30 cm      |
/// | 30–44  | humid and overcast, water at 40 cm     |
/// | 45–59  | storm: dark, saturated, water at 12 cm |
/// | 60–74  | hygrometer dead, ranger intermittent   |
/// | 75–89  | receding                               |
pub fn scenario_snapshot(cycle: u64) -> SensorSnapshot {
    let t = cycle % SCENARIO_CYCLES;
    let motion = t % 7 == 0;
    match t {
        0..=14 => SensorSnapshot::from_raw(120.0, 55.0, 24.0, 70.0, motion),
        15..=29 => {
            let water = 120.0 - (t - 14) as f32 * 6.0;
            SensorSnapshot::from_raw(water, 70.0, 23.0, 45.0, motion)
        }
        30..=44 => SensorSnapshot::from_raw(40.0, 88.0, 21.5, 30.0, motion),
        45..=59 => SensorSnapshot::from_raw(12.0, 95.0, 21.0, 4.0, true),
        60..=74 => {
            let water = if t % 3 == 0 { -1.0 } else { 50.0 };
            SensorSnapshot::from_raw(water, f32::NAN, f32::NAN, 20.0, motion)
        }
        _ => {
            let water = 50.0 + (t - 74) as f32 * 5.0;
            SensorSnapshot::from_raw(water, 65.0, 23.5, 60.0, motion)
        }
    }
}

pub struct SimulatedHardware {
    cycle: u64,
    buzzer: Option<&'static BuzzerChannel>,
    display: DisplayText,
    alarms: usize,
}

impl SimulatedHardware {
    /// `buzzer`: where alarm requests go, or `None` to only count them.
    pub fn new(buzzer: Option<&'static BuzzerChannel>) -> Self {
        Self {
            cycle: 0,
            buzzer,
            display: DisplayText::default(),
            alarms: 0,
        }
    }

    /// Text currently on the simulated LCD.
    pub fn display(&self) -> &DisplayText {
        &self.display
    }

    /// Alarm patterns requested so far.
    pub fn alarms(&self) -> usize {
        self.alarms
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

impl SensorPort for SimulatedHardware {
    fn read_snapshot(&mut self) -> SensorSnapshot {
        let snap = scenario_snapshot(self.cycle);
        self.cycle += 1;
        snap
    }
}

impl ActuatorPort for SimulatedHardware {
    fn show(&mut self, text: &DisplayText) {
        if self.display != *text {
            info!("LCD   | {:<16} | {:<16}", text.line1.as_str(), text.line2.as_str());
            self.display = text.clone();
        }
    }

    fn play_alarm(&mut self, pattern: AlarmPattern) {
        self.alarms += 1;
        if let Some(ch) = self.buzzer {
            buzzer::request(ch, BuzzerMsg::Play(pattern));
        }
    }

    fn silence(&mut self) {
        if let Some(ch) = self.buzzer {
            buzzer::request(ch, BuzzerMsg::Silence);
        }
    }
}

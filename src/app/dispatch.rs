//! Actuation dispatcher: what to show and what to sound.
//!
//! Both outputs are plain values.  The dispatcher never touches hardware
//! and never sleeps; the [`ActuatorPort`](super::ports::ActuatorPort)
//! adapter turns a [`DisplayText`] into LCD writes and hands an
//! [`AlarmPattern`] to the buzzer task, which plays it on its own clock.

use core::fmt::{self, Write};

use crate::monitor::AlertLevel;
use crate::monitor::context::SensorSnapshot;

/// Character columns on the 16×2 display.
pub const LCD_COLS: usize = 16;

/// One display line, at most [`LCD_COLS`] characters.
pub type DisplayLine = heapless::String<LCD_COLS>;

// ───────────────────────────────────────────────────────────────
// Display text
// ───────────────────────────────────────────────────────────────

/// Two lines for the character display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayText {
    pub line1: DisplayLine,
    pub line2: DisplayLine,
}

impl DisplayText {
    /// Build from two strings, truncating each to the display width.
    pub fn new(line1: &str, line2: &str) -> Self {
        let mut text = Self::default();
        let _ = text.line1_writer().write_str(line1);
        let _ = text.line2_writer().write_str(line2);
        text
    }

    fn line1_writer(&mut self) -> Clipped<'_> {
        Clipped(&mut self.line1)
    }

    fn line2_writer(&mut self) -> Clipped<'_> {
        Clipped(&mut self.line2)
    }
}

/// `fmt::Write` adapter that drops whatever does not fit in the line.
struct Clipped<'a>(&'a mut DisplayLine);

impl Write for Clipped<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Alarm pattern
// ───────────────────────────────────────────────────────────────

/// One step of an alarm: a tone (or a rest when `frequency_hz == 0`) held
/// for `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub frequency_hz: u16,
    pub duration_ms: u16,
}

impl Pulse {
    pub const fn tone(frequency_hz: u16, duration_ms: u16) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    pub const fn rest(duration_ms: u16) -> Self {
        Self {
            frequency_hz: 0,
            duration_ms,
        }
    }

    pub const fn is_rest(&self) -> bool {
        self.frequency_hz == 0
    }
}

const ATTENTION_BEEPS: [Pulse; 4] = [
    Pulse::tone(1000, 200),
    Pulse::rest(200),
    Pulse::tone(1000, 200),
    Pulse::rest(200),
];

const EVACUATION_SIREN: [Pulse; 10] = [
    Pulse::tone(2000, 300),
    Pulse::tone(1500, 300),
    Pulse::tone(2000, 300),
    Pulse::tone(1500, 300),
    Pulse::tone(2000, 300),
    Pulse::tone(1500, 300),
    Pulse::tone(2000, 300),
    Pulse::tone(1500, 300),
    Pulse::tone(2000, 300),
    Pulse::tone(1500, 300),
];

/// Declarative alarm: an ordered, possibly empty, list of pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmPattern {
    pulses: &'static [Pulse],
}

impl AlarmPattern {
    pub const SILENT: Self = Self { pulses: &[] };

    pub const fn new(pulses: &'static [Pulse]) -> Self {
        Self { pulses }
    }

    pub fn pulses(&self) -> &'static [Pulse] {
        self.pulses
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Number of audible (non-rest) pulses.
    pub fn tone_count(&self) -> usize {
        self.pulses.iter().filter(|p| !p.is_rest()).count()
    }

    /// Wall-clock length of the whole pattern.
    pub fn total_duration_ms(&self) -> u32 {
        self.pulses.iter().map(|p| u32::from(p.duration_ms)).sum()
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct ActuationDispatcher;

impl ActuationDispatcher {
    pub const fn new() -> Self {
        Self
    }

    /// Line 1: temperature and humidity, or `Sensor Error!` if either is
    /// invalid.  Line 2: the level message; Normal includes the live water
    /// distance when there is an echo.
    pub fn render_display(&self, snapshot: &SensorSnapshot, level: AlertLevel) -> DisplayText {
        let mut text = DisplayText::default();

        {
            let mut w = text.line1_writer();
            let _ = match (snapshot.valid_temperature(), snapshot.valid_humidity()) {
                (Some(t), Some(h)) => write!(w, "T:{:.1}C H:{:.0}%", t, h),
                _ => w.write_str("Sensor Error!"),
            };
        }

        {
            let mut w = text.line2_writer();
            let _ = match level {
                AlertLevel::Normal => match snapshot.valid_water_cm() {
                    Some(d) => write!(w, "Normal {:.0}cm", d),
                    None => w.write_str("System Normal"),
                },
                AlertLevel::Attention => w.write_str("ATTENTION!"),
                AlertLevel::Critical => w.write_str("EVACUATION!"),
            };
        }

        text
    }

    /// The alarm to play when the cadence gate says one is due.
    pub fn alarm_pattern(&self, level: AlertLevel) -> AlarmPattern {
        match level {
            AlertLevel::Normal => AlarmPattern::SILENT,
            AlertLevel::Attention => AlarmPattern::new(&ATTENTION_BEEPS),
            AlertLevel::Critical => AlarmPattern::new(&EVACUATION_SIREN),
        }
    }
}

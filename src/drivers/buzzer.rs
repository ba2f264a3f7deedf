//! Passive buzzer: non-blocking alarm playback.
//!
//! The control loop never waits on a tone.  It posts a [`BuzzerMsg`] to
//! [`BUZZER_CHANNEL`] and moves on; a dedicated thread running
//! [`BuzzerTask`] walks the pattern with a [`ToneSequencer`] and drives the
//! [`ToneOutput`].  A newer message preempts whatever is playing.
//!
//! ```text
//! ┌──────────────┐  BuzzerMsg   ┌──────────────────────────────┐
//! │ Control Loop │─────────────▶│ Buzzer thread                │
//! │  (1 Hz)      │  try_send    │  ToneSequencer ──▶ ToneOutput │
//! └──────────────┘              └──────────────────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use crate::app::dispatch::AlarmPattern;
use crate::sensors::MicrosClock;

/// Messages accepted by the buzzer thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerMsg {
    Play(AlarmPattern),
    Silence,
}

/// Channel depth for buzzer requests.
pub const BUZZER_DEPTH: usize = 4;

pub type BuzzerChannel = Channel<CriticalSectionRawMutex, BuzzerMsg, BUZZER_DEPTH>;

/// Control loop → buzzer thread.
pub static BUZZER_CHANNEL: BuzzerChannel = Channel::new();

/// Queue a request without blocking.  Returns `false` if the queue is full.
pub fn request(channel: &BuzzerChannel, msg: BuzzerMsg) -> bool {
    if channel.try_send(msg).is_err() {
        warn!("Buzzer: request queue full, dropping {:?}", msg);
        return false;
    }
    true
}

// ───────────────────────────────────────────────────────────────
// Output
// ───────────────────────────────────────────────────────────────

/// Something that can emit a square-wave tone.
pub trait ToneOutput {
    fn tone(&mut self, frequency_hz: u16);
    fn no_tone(&mut self);
}

/// LEDC-driven piezo on [`BUZZER_GPIO`](crate::pins::BUZZER_GPIO).
pub struct LedcTone;

impl ToneOutput for LedcTone {
    fn tone(&mut self, frequency_hz: u16) {
        super::hw_init::buzzer_tone(u32::from(frequency_hz));
    }

    fn no_tone(&mut self) {
        super::hw_init::buzzer_off();
    }
}

/// Simulation output: tones go to the log.
pub struct LogTone;

impl ToneOutput for LogTone {
    fn tone(&mut self, frequency_hz: u16) {
        debug!("Buzzer(sim): {} Hz", frequency_hz);
    }

    fn no_tone(&mut self) {
        debug!("Buzzer(sim): off");
    }
}

// ───────────────────────────────────────────────────────────────
// Sequencer
// ───────────────────────────────────────────────────────────────

/// Output change requested by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneCommand {
    Tone(u16),
    Off,
}

/// Pure, time-driven walker over an [`AlarmPattern`].
///
/// Feed it the current time; it answers with the output change (if any)
/// that should happen now.  Never sleeps.
#[derive(Debug, Clone, Copy)]
pub struct ToneSequencer {
    pattern: AlarmPattern,
    index: usize,
    step_started_ms: u64,
    output: Option<u16>,
    playing: bool,
}

impl Default for ToneSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneSequencer {
    pub const fn new() -> Self {
        Self {
            pattern: AlarmPattern::SILENT,
            index: 0,
            step_started_ms: 0,
            output: None,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Begin `pattern` at `now_ms`, replacing anything in progress.
    pub fn start(&mut self, pattern: AlarmPattern, now_ms: u64) -> Option<ToneCommand> {
        self.pattern = pattern;
        self.index = 0;
        self.step_started_ms = now_ms;
        self.playing = !pattern.is_empty();
        self.apply(self.desired())
    }

    /// Stop immediately.
    pub fn stop(&mut self) -> Option<ToneCommand> {
        self.playing = false;
        self.apply(None)
    }

    /// Advance to `now_ms`, skipping any steps that already elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<ToneCommand> {
        if !self.playing {
            return None;
        }
        let pulses = self.pattern.pulses();
        while self.index < pulses.len() {
            let step = u64::from(pulses[self.index].duration_ms);
            if now_ms.saturating_sub(self.step_started_ms) < step {
                break;
            }
            self.step_started_ms += step;
            self.index += 1;
        }
        if self.index >= pulses.len() {
            self.playing = false;
        }
        self.apply(self.desired())
    }

    /// When the current step ends, if playing.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.playing.then(|| {
            self.step_started_ms + u64::from(self.pattern.pulses()[self.index].duration_ms)
        })
    }

    fn desired(&self) -> Option<u16> {
        if !self.playing {
            return None;
        }
        let pulse = self.pattern.pulses()[self.index];
        (!pulse.is_rest()).then_some(pulse.frequency_hz)
    }

    fn apply(&mut self, desired: Option<u16>) -> Option<ToneCommand> {
        if desired == self.output {
            return None;
        }
        self.output = desired;
        Some(desired.map_or(ToneCommand::Off, ToneCommand::Tone))
    }
}

// ───────────────────────────────────────────────────────────────
// Task
// ───────────────────────────────────────────────────────────────

/// Idle poll period of the buzzer thread.
const IDLE_POLL_MS: u64 = 20;
/// Upper bound on a single sleep while a pattern is playing.
const PLAYING_POLL_MS: u64 = 5;

pub struct BuzzerTask<O, C> {
    channel: &'static BuzzerChannel,
    output: O,
    clock: C,
    sequencer: ToneSequencer,
}

impl<O: ToneOutput, C: MicrosClock> BuzzerTask<O, C> {
    pub fn new(channel: &'static BuzzerChannel, output: O, clock: C) -> Self {
        Self {
            channel,
            output,
            clock,
            sequencer: ToneSequencer::new(),
        }
    }

    /// One iteration: take the newest request, advance the sequencer,
    /// drive the output.  Returns how long the caller may sleep.
    pub fn step(&mut self) -> u64 {
        let now_ms = self.clock.micros() / 1000;

        let mut latest = None;
        while let Ok(msg) = self.channel.try_receive() {
            latest = Some(msg);
        }
        let command = match latest {
            Some(BuzzerMsg::Play(pattern)) => {
                debug!(
                    "Buzzer: playing {} pulses ({} ms)",
                    pattern.pulses().len(),
                    pattern.total_duration_ms()
                );
                self.sequencer.start(pattern, now_ms)
            }
            Some(BuzzerMsg::Silence) => self.sequencer.stop(),
            None => self.sequencer.poll(now_ms),
        };

        match command {
            Some(ToneCommand::Tone(hz)) => self.output.tone(hz),
            Some(ToneCommand::Off) => self.output.no_tone(),
            None => {}
        }

        match self.sequencer.next_deadline_ms() {
            Some(deadline) => deadline.saturating_sub(now_ms).clamp(1, PLAYING_POLL_MS),
            None => IDLE_POLL_MS,
        }
    }

    /// Thread body.  Never returns.
    pub fn run(mut self) -> ! {
        loop {
            let sleep_ms = self.step();
            std::thread::sleep(std::time::Duration::from_millis(sleep_ms));
        }
    }
}

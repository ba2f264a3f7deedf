//! Mock adapters for integration tests.
//!
//! Records every actuator call and every emitted event so tests can assert
//! on the full history without touching real GPIO, I²C or LEDC.

use std::collections::VecDeque;
use std::path::PathBuf;

use floodwatch::app::dispatch::{AlarmPattern, DisplayText};
use floodwatch::app::events::AppEvent;
use floodwatch::app::ports::{ActuatorPort, EventSink, SensorPort};
use floodwatch::monitor::context::SensorSnapshot;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Show(DisplayText),
    Alarm(AlarmPattern),
    Silence,
}

// ── MockHardware ──────────────────────────────────────────────

/// Serves queued snapshots; once the queue is empty the last one repeats.
pub struct MockHardware {
    queue: VecDeque<SensorSnapshot>,
    current: SensorSnapshot,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(initial: SensorSnapshot) -> Self {
        Self {
            queue: VecDeque::new(),
            current: initial,
            calls: Vec::new(),
        }
    }

    /// Serve `snapshot` from the next read on.
    pub fn set(&mut self, snapshot: SensorSnapshot) {
        self.queue.clear();
        self.current = snapshot;
    }

    pub fn push(&mut self, snapshot: SensorSnapshot) {
        self.queue.push_back(snapshot);
    }

    pub fn alarms(&self) -> Vec<AlarmPattern> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Alarm(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn silences(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Silence))
            .count()
    }

    pub fn last_display(&self) -> Option<&DisplayText> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Show(t) => Some(t),
            _ => None,
        })
    }

    pub fn displays(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::Show(_)))
            .count()
    }
}

impl SensorPort for MockHardware {
    fn read_snapshot(&mut self) -> SensorSnapshot {
        if let Some(next) = self.queue.pop_front() {
            self.current = next;
        }
        self.current
    }
}

impl ActuatorPort for MockHardware {
    fn show(&mut self, text: &DisplayText) {
        self.calls.push(ActuatorCall::Show(text.clone()));
    }

    fn play_alarm(&mut self, pattern: AlarmPattern) {
        self.calls.push(ActuatorCall::Alarm(pattern));
    }

    fn silence(&mut self) {
        self.calls.push(ActuatorCall::Silence);
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Snapshots ─────────────────────────────────────────────────

#[allow(dead_code)]
pub fn snap(water: f32, humidity: f32, temp: f32, light: f32, motion: bool) -> SensorSnapshot {
    SensorSnapshot::from_raw(water, humidity, temp, light, motion)
}

/// Dry, bright, water far away.
#[allow(dead_code)]
pub fn calm() -> SensorSnapshot {
    snap(40.0, 60.0, 20.0, 50.0, true)
}

/// Water at 25 cm.
#[allow(dead_code)]
pub fn rising() -> SensorSnapshot {
    snap(25.0, 60.0, 20.0, 50.0, false)
}

/// Water at 12 cm.
#[allow(dead_code)]
pub fn flood() -> SensorSnapshot {
    snap(12.0, 50.0, 25.0, 80.0, false)
}

// ── Scratch directories ───────────────────────────────────────

/// Fresh, empty directory unique to this test process and `tag`.
#[allow(dead_code)]
pub fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("floodwatch-it-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

//! Integration tests for the MonitorService cycle: sensors → classifier →
//! state machine → cadence gates → actuators / store / events.
//!
//! Time is driven explicitly, so every gate edge is deterministic.

use floodwatch::adapters::simulation::{SCENARIO_CYCLES, SimulatedHardware};
use floodwatch::adapters::storage::MemoryStore;
use floodwatch::app::dispatch::ActuationDispatcher;
use floodwatch::app::events::AppEvent;
use floodwatch::app::ports::{RecordInfo, RecordStore, StorageError};
use floodwatch::app::service::MonitorService;
use floodwatch::config::MonitorConfig;
use floodwatch::monitor::AlertLevel;
use floodwatch::record::PersistenceRecord;
use floodwatch::risk::RiskReason;

use super::mock_hw::{MockHardware, RecordingSink, calm, flood, rising, snap};

fn make_service() -> (MonitorService, MemoryStore, RecordingSink) {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, MemoryStore::new(50), sink)
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn close_water_evacuates_with_siren() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(flood());

    let report = svc.tick(11_000, &mut hw, &mut store, &mut sink);

    assert_eq!(svc.level(), AlertLevel::Critical);
    assert!(report.alarm_fired);
    assert_eq!(
        report.assessment.and_then(|a| a.reason),
        Some(RiskReason::WaterCritical)
    );
    assert_eq!(hw.last_display().unwrap().line2.as_str(), "EVACUATION!");

    let alarms = hw.alarms();
    assert_eq!(alarms.len(), 1);
    let pulses = alarms[0].pulses();
    assert_eq!(pulses.len(), 10);
    assert!(pulses.iter().step_by(2).all(|p| p.frequency_hz == 2000));
    assert!(pulses.iter().skip(1).step_by(2).all(|p| p.frequency_hz == 1500));
}

#[test]
fn storm_signature_without_echo_is_critical() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(snap(-1.0, 92.0, 25.0, 5.0, false));

    let report = svc.tick(11_000, &mut hw, &mut store, &mut sink);

    assert_eq!(svc.level(), AlertLevel::Critical);
    assert_eq!(
        report.assessment.and_then(|a| a.reason),
        Some(RiskReason::StormSignature)
    );
    assert!(sink.events.contains(&AppEvent::LevelChanged {
        from: AlertLevel::Normal,
        to: AlertLevel::Critical,
        reason: Some(RiskReason::StormSignature),
    }));
}

#[test]
fn calm_conditions_show_live_distance() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(calm());

    let report = svc.tick(11_000, &mut hw, &mut store, &mut sink);

    assert!(!report.transition.changed);
    assert_eq!(svc.level(), AlertLevel::Normal);
    assert_eq!(hw.last_display().unwrap().line2.as_str(), "Normal 40cm");
    assert!(hw.alarms().is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LevelChanged { .. })), 0);
}

#[test]
fn composite_fault_still_evaluates_remaining_channels() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(snap(12.0, f32::NAN, f32::NAN, 80.0, false));

    let report = svc.tick(11_000, &mut hw, &mut store, &mut sink);

    assert!(!report.skipped);
    assert_eq!(svc.level(), AlertLevel::Critical);
    assert_eq!(hw.last_display().unwrap().line1.as_str(), "Sensor Error!");
    assert!(sink.events.contains(&AppEvent::FaultDetected(0b110)));
}

// ── Alarm gate ────────────────────────────────────────────────

#[test]
fn alarm_cooldown_spans_level_changes() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(rising());

    // Attention after the boot window: fires.
    assert!(svc.tick(11_000, &mut hw, &mut store, &mut sink).alarm_fired);

    // Back to Normal: the buzzer is silenced.
    hw.set(calm());
    svc.tick(12_000, &mut hw, &mut store, &mut sink);
    assert_eq!(hw.silences(), 1);

    // Critical 4 s after the last alarm: suppressed.
    hw.set(flood());
    assert!(!svc.tick(15_000, &mut hw, &mut store, &mut sink).alarm_fired);
    assert!(sink.events.contains(&AppEvent::AlarmSuppressed {
        level: AlertLevel::Critical,
        cooldown_remaining_ms: 6_001,
    }));

    // Exactly 10 s after: still suppressed (the gate is strict).
    hw.set(calm());
    svc.tick(16_000, &mut hw, &mut store, &mut sink);
    hw.set(flood());
    assert!(!svc.tick(21_000, &mut hw, &mut store, &mut sink).alarm_fired);

    hw.set(calm());
    svc.tick(21_500, &mut hw, &mut store, &mut sink);
    hw.set(flood());
    assert!(svc.tick(22_000, &mut hw, &mut store, &mut sink).alarm_fired);

    // Staying Critical never re-fires.
    for t in (23_000..60_000).step_by(1_000) {
        svc.tick(t, &mut hw, &mut store, &mut sink);
    }

    let dispatcher = ActuationDispatcher::new();
    assert_eq!(
        hw.alarms(),
        vec![
            dispatcher.alarm_pattern(AlertLevel::Attention),
            dispatcher.alarm_pattern(AlertLevel::Critical),
        ]
    );
    assert_eq!(svc.alert_state().last_alarm_fire, 22_000);
}

#[test]
fn level_change_is_announced_once() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(rising());

    for t in (1_000..=5_000).step_by(1_000) {
        svc.tick(t, &mut hw, &mut store, &mut sink);
    }

    assert_eq!(sink.count(|e| matches!(e, AppEvent::LevelChanged { .. })), 1);
    assert_eq!(svc.alert_state().level_since, 1_000);
}

// ── Persistence gate ──────────────────────────────────────────

#[test]
fn records_are_saved_on_fixed_cadence_at_normal() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(calm());

    let saved: Vec<String> = (1..=90)
        .filter_map(|i| svc.tick(i * 1_000, &mut hw, &mut store, &mut sink).saved)
        .collect();

    assert_eq!(
        saved,
        ["data_30000.json", "data_60000.json", "data_90000.json"]
    );
    assert_eq!(svc.level(), AlertLevel::Normal);
    assert_eq!(store.count(), 3);
}

#[test]
fn stored_record_carries_snapshot_and_flags() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(flood());

    let name = svc
        .tick(30_000, &mut hw, &mut store, &mut sink)
        .saved
        .expect("persist gate due at 30 s");

    let bytes = store.read(&name).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["device_id"], "flood_monitor_01");
    assert_eq!(doc["timestamp"], 30_000);
    assert_eq!(doc["sensors"]["water_distance"], 12.0);
    assert_eq!(doc["sensors"]["motion_detected"], false);
    assert_eq!(doc["status"]["alert_level"], 2);
    assert_eq!(doc["status"]["alert_name"], "CRITICAL");
    assert_eq!(doc["analysis"]["flood_risk"], true);
    assert_eq!(doc["analysis"]["evacuation_needed"], true);

    let record = PersistenceRecord::from_json(&bytes).unwrap();
    assert_eq!(record.level(), Some(AlertLevel::Critical));
}

/// Fails the first `failures` saves, then stores names only.
struct FlakyStore {
    failures: usize,
    names: Vec<String>,
}

impl RecordStore for FlakyStore {
    fn save(&mut self, record: &PersistenceRecord) -> Result<String, StorageError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(StorageError::Full);
        }
        let name = format!("data_{}.json", record.timestamp);
        self.names.push(name.clone());
        Ok(name)
    }
    fn list(&self) -> Result<Vec<RecordInfo>, StorageError> {
        Ok(Vec::new())
    }
    fn read(&self, _: &str) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::NotFound)
    }
    fn delete(&mut self, _: &str) -> Result<(), StorageError> {
        Err(StorageError::NotFound)
    }
    fn count(&self) -> usize {
        self.names.len()
    }
    fn kind(&self) -> &'static str {
        "flaky"
    }
}

#[test]
fn failed_save_waits_for_next_interval() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(calm());
    let mut store = FlakyStore {
        failures: 1,
        names: Vec::new(),
    };

    for i in 1..=60 {
        svc.tick(i * 1_000, &mut hw, &mut store, &mut sink);
    }

    assert_eq!(sink.count(|e| matches!(e, AppEvent::StorageFailed(StorageError::Full))), 1);
    assert_eq!(store.names, ["data_60000.json"]);
}

// ── Diagnostic gate ───────────────────────────────────────────

#[test]
fn diagnostics_are_spaced_under_loop_jitter() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = MockHardware::new(calm());

    for i in 1..=40u64 {
        let now = i * 1_000 + (i % 3) * 7;
        svc.tick(now, &mut hw, &mut store, &mut sink);
    }

    let stamps: Vec<u64> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Diagnostic(r) => Some(r.uptime_ms),
            _ => None,
        })
        .collect();

    assert!(stamps.len() >= 6, "got {:?}", stamps);
    assert!(stamps[0] >= 5_000);
    for pair in stamps.windows(2) {
        let gap = pair[1] - pair[0];
        assert!((5_000..=6_100).contains(&gap), "gap {} in {:?}", gap, stamps);
    }
}

// ── Whole scenario ────────────────────────────────────────────

#[test]
fn simulated_flood_runs_end_to_end() {
    let (mut svc, mut store, mut sink) = make_service();
    let mut hw = SimulatedHardware::new(None);

    let mut seen = Vec::new();
    for cycle in 0..SCENARIO_CYCLES {
        svc.tick((cycle + 1) * 1_000, &mut hw, &mut store, &mut sink);
        if seen.last() != Some(&svc.level()) {
            seen.push(svc.level());
        }
    }

    assert_eq!(
        seen,
        [
            AlertLevel::Normal,
            AlertLevel::Attention,
            AlertLevel::Critical,
            AlertLevel::Normal,
        ]
    );
    assert_eq!(hw.alarms(), 2);
    assert_eq!(store.count(), 3);
    assert_eq!(svc.cycle_count(), SCENARIO_CYCLES);
}

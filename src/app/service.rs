//! Monitor service: the hexagonal core.
//!
//! [`MonitorService`] owns the alert state and the decision components and
//! runs one cycle per [`tick`](MonitorService::tick).  All I/O flows
//! through port traits injected at call sites, so the whole cycle is
//! testable with mock adapters and a fake clock.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │        MonitorService         │
//! ActuatorPort ◀──│ Classifier · StateMachine ·   │──▶ RecordStore
//!                 │ Cadence · Dispatcher          │
//!                 └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{CompositeFaultPolicy, MonitorConfig};
use crate::diagnostics::{DiagnosticReport, StatusReport, heap_free};
use crate::monitor::context::{AlertState, Millis, SensorSnapshot};
use crate::monitor::{AlertLevel, AlertStateMachine, Transition};
use crate::record::PersistenceRecord;
use crate::risk::{Assessment, RiskClassifier};
use crate::scheduler::CadenceScheduler;

use super::dispatch::ActuationDispatcher;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, RecordStore, SensorPort};

// ───────────────────────────────────────────────────────────────
// Cycle report
// ───────────────────────────────────────────────────────────────

/// What one cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub snapshot: SensorSnapshot,
    pub transition: Transition,
    /// `None` when the cycle was skipped.
    pub assessment: Option<Assessment>,
    pub alarm_fired: bool,
    /// Name of the record written this cycle, if any.
    pub saved: Option<String>,
    pub diagnostic: bool,
    pub skipped: bool,
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService {
    config: MonitorConfig,
    state: AlertState,
    classifier: RiskClassifier,
    machine: AlertStateMachine,
    cadence: CadenceScheduler,
    dispatcher: ActuationDispatcher,
    fault_flags: u8,
    cycle_count: u64,
}

impl MonitorService {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            classifier: RiskClassifier::new(&config),
            cadence: CadenceScheduler::new(&config),
            machine: AlertStateMachine::new(),
            dispatcher: ActuationDispatcher::new(),
            state: AlertState::new(),
            fault_flags: 0,
            cycle_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.state.current_level));
        info!(
            "MonitorService started ({}, policy {:?})",
            self.config.device_id, self.config.composite_fault_policy
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one decision cycle at uptime `now`.
    ///
    /// Order: acquire → fault tracking → classify → transition → alarm
    /// gate → display → persistence gate → diagnostic gate.
    pub fn tick(
        &mut self,
        now: Millis,
        hw: &mut (impl SensorPort + ActuatorPort),
        store: &mut impl RecordStore,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.cycle_count += 1;

        // 1. Acquisition
        let snapshot = hw.read_snapshot();
        self.track_faults(&snapshot, sink);

        // 2. Composite fault: optionally hold the previous level
        if self.config.composite_fault_policy == CompositeFaultPolicy::HoldLastLevel
            && snapshot.hygrometer_lost()
        {
            let held = self.state.current_level;
            warn!("Hygrometer lost; holding {} for this cycle", held);
            sink.emit(&AppEvent::CycleSkipped { held });
            return CycleReport {
                snapshot,
                transition: Transition {
                    changed: false,
                    from: held,
                    to: held,
                },
                assessment: None,
                alarm_fired: false,
                saved: None,
                diagnostic: false,
                skipped: true,
            };
        }

        // 3. Classification + transition
        let assessment = self.classifier.assess(&snapshot);
        let transition = self.machine.update(&mut self.state, assessment.level, now);
        if transition.changed {
            sink.emit(&AppEvent::LevelChanged {
                from: transition.from,
                to: transition.to,
                reason: assessment.reason,
            });
        }

        // 4. Alarm gate.  All gates are read before any timer moves.
        let due = self.cadence.poll(&transition, &self.state, now);
        let alarm_fired = self.run_alarm_gate(due.alarm, &transition, now, hw, sink);

        // 5. Display, every cycle
        hw.show(&self.dispatcher.render_display(&snapshot, assessment.level));

        // 6. Persistence gate
        let saved = if due.persist {
            let saved = self.persist(&snapshot, now, store, sink);
            self.cadence.mark_persist(&mut self.state, now);
            saved
        } else {
            None
        };

        // 7. Diagnostic gate
        let diagnostic = due.diagnostic;
        if diagnostic {
            let report = DiagnosticReport::new(now, snapshot, assessment.level);
            sink.emit(&AppEvent::Diagnostic(report));
            self.cadence.mark_diagnostic(&mut self.state, now);
        }

        CycleReport {
            snapshot,
            transition,
            assessment: Some(assessment),
            alarm_fired,
            saved,
            diagnostic,
            skipped: false,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Console `STATUS` answer.  Reads state only.
    pub fn status(&self, now: Millis, store: &impl RecordStore) -> StatusReport {
        StatusReport {
            device_id: self.config.device_id.clone(),
            uptime_secs: now / 1000,
            level: self.state.current_level,
            records: store.count(),
            storage: store.kind(),
            heap_free: heap_free(),
        }
    }

    pub fn level(&self) -> AlertLevel {
        self.state.current_level
    }

    pub fn alert_state(&self) -> &AlertState {
        &self.state
    }

    /// Current sensor fault bitmask (0 = all channels valid).
    pub fn fault_flags(&self) -> u8 {
        self.fault_flags
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn track_faults(&mut self, snapshot: &SensorSnapshot, sink: &mut impl EventSink) {
        let faults = snapshot.faults();
        let raised = faults & !self.fault_flags;
        let cleared = self.fault_flags & !faults;

        if raised != 0 {
            warn!("Sensor fault raised: flags=0b{:03b}", raised);
            sink.emit(&AppEvent::FaultDetected(raised));
        }
        if cleared != 0 {
            info!("Sensor fault cleared: flags=0b{:03b}", cleared);
            sink.emit(&AppEvent::FaultCleared(cleared));
        }
        self.fault_flags = faults;
    }

    fn run_alarm_gate(
        &mut self,
        due: bool,
        transition: &Transition,
        now: Millis,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if due {
            let pattern = self.dispatcher.alarm_pattern(transition.to);
            hw.play_alarm(pattern);
            self.cadence.mark_alarm(&mut self.state, now);
            sink.emit(&AppEvent::AlarmFired {
                level: transition.to,
                pulses: pattern.pulses().len(),
            });
            return true;
        }

        if transition.changed {
            if transition.to.is_alarming() {
                sink.emit(&AppEvent::AlarmSuppressed {
                    level: transition.to,
                    cooldown_remaining_ms: self.cadence.cooldown_remaining(&self.state, now),
                });
            } else {
                hw.silence();
            }
        }
        false
    }

    fn persist(
        &self,
        snapshot: &SensorSnapshot,
        now: Millis,
        store: &mut impl RecordStore,
        sink: &mut impl EventSink,
    ) -> Option<String> {
        let record = PersistenceRecord::build(
            snapshot,
            self.state.current_level,
            &self.config.device_id,
            now,
        );
        match store.save(&record) {
            Ok(name) => {
                sink.emit(&AppEvent::RecordSaved {
                    name: name.clone(),
                    total: store.count(),
                });
                Some(name)
            }
            Err(e) => {
                warn!("Record save failed: {}", e);
                sink.emit(&AppEvent::StorageFailed(e));
                None
            }
        }
    }
}

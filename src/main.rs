//! Flood Monitor firmware: main entry point.
//!
//! Hexagonal architecture around a cooperative 1 Hz control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter / SimulatedHardware   LogEventSink            │
//! │  (Sensor+Actuator)                     (EventSink)             │
//! │  MemoryStore / FileStore               FileConfigStore         │
//! │  (RecordStore)                         (ConfigPort)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             MonitorService (pure logic)                │    │
//! │  │  RiskClassifier · AlertStateMachine · CadenceScheduler │    │
//! │  │  ActuationDispatcher · PersistenceRecord               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Buzzer thread (ToneSequencer) · Console reader thread         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On ESP-IDF the adapters drive the real peripherals.  On the host the
//! same loop runs against a scripted flood scenario, with commands typed
//! on stdin.

#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{info, warn};

use floodwatch::adapters::config_file::{self, FileConfigStore};
use floodwatch::adapters::console_input::{self, CONSOLE_CHANNEL};
use floodwatch::adapters::log_sink::LogEventSink;
use floodwatch::adapters::storage;
use floodwatch::adapters::time::MonotonicClock;
use floodwatch::app::commands::ConsoleCommand;
use floodwatch::app::console;
use floodwatch::app::dispatch::DisplayText;
use floodwatch::app::ports::{ActuatorPort, SensorPort};
use floodwatch::app::service::MonitorService;
use floodwatch::config::MonitorConfig;
use floodwatch::diagnostics;
use floodwatch::drivers::buzzer::{BUZZER_CHANNEL, BuzzerTask};
use floodwatch::drivers::hw_init;
use floodwatch::drivers::task_pin::{self, Core};
use floodwatch::drivers::watchdog::Watchdog;

// ── Logging ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

/// fmt subscriber with `RUST_LOG` filtering (default `info`).  The
/// subscriber's log bridge picks up every `log` record in the crate.
#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow!("logger init failed: {e}"))
}

// ── Hardware ──────────────────────────────────────────────────

/// Take the peripherals and build the sensor hub, LCD and buzzer link.
/// The LCD shows the boot banner as soon as it is up.
#[cfg(target_os = "espidf")]
fn build_hardware(clock: MonotonicClock) -> Result<impl SensorPort + ActuatorPort> {
    use esp_idf_hal::delay::Ets;
    use esp_idf_hal::gpio::PinDriver;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;

    use floodwatch::adapters::hardware::HardwareAdapter;
    use floodwatch::drivers::lcd::Lcd1602;
    use floodwatch::pins;
    use floodwatch::sensors::SensorHub;
    use floodwatch::sensors::dht::Dht22;
    use floodwatch::sensors::light::LdrSensor;
    use floodwatch::sensors::motion::PirSensor;
    use floodwatch::sensors::ultrasonic::Hcsr04;

    let p = Peripherals::take()?;

    // GPIO numbers mirror `pins`.
    let trig = PinDriver::output(p.pins.gpio5)?;
    let echo = PinDriver::input(p.pins.gpio18)?;
    let dht = PinDriver::input_output_od(p.pins.gpio22)?;
    let pir = PinDriver::input(p.pins.gpio19)?;

    let i2c = I2cDriver::new(
        p.i2c0,
        p.pins.gpio21,
        p.pins.gpio23,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut lcd = Lcd1602::new(i2c, Ets, pins::LCD_I2C_ADDR);
    if let Err(e) = lcd
        .init()
        .and_then(|()| lcd.write_lines("Flood Monitor", "Starting..."))
    {
        warn!("LCD: {}, continuing without display", e);
    }

    let hub = SensorHub::new(
        Hcsr04::new(trig, echo, Ets, clock),
        Dht22::new(dht, Ets, clock),
        LdrSensor::new(pins::LDR_ADC1_CHANNEL),
        PirSensor::new(pir),
    );
    Ok(HardwareAdapter::new(hub, lcd, &BUZZER_CHANNEL))
}

#[cfg(not(target_os = "espidf"))]
fn build_hardware(_clock: MonotonicClock) -> Result<impl SensorPort + ActuatorPort> {
    use floodwatch::adapters::simulation::SimulatedHardware;

    let mut hw = SimulatedHardware::new(Some(&BUZZER_CHANNEL));
    hw.show(&DisplayText::new("Flood Monitor", "Starting..."));
    Ok(hw)
}

fn spawn_buzzer(clock: MonotonicClock) -> Result<()> {
    #[cfg(target_os = "espidf")]
    let output = floodwatch::drivers::buzzer::LedcTone;
    #[cfg(not(target_os = "espidf"))]
    let output = floodwatch::drivers::buzzer::LogTone;

    let task = BuzzerTask::new(&BUZZER_CHANNEL, output, clock);
    task_pin::spawn_on_core(Core::App, 4, 4, "buzzer\0", move || task.run())?;
    Ok(())
}

/// The config blob always lives under the default storage root.
fn config_store() -> FileConfigStore {
    FileConfigStore::new(MonitorConfig::default().storage_root.as_str())
}

/// Config blob from the storage root, or defaults.
fn load_config(store: &FileConfigStore) -> MonitorConfig {
    let defaults = MonitorConfig::default();
    if let Err(e) = hw_init::mount_spiffs(defaults.storage_root.as_str()) {
        warn!("Config: {}, using defaults", e);
        return defaults;
    }
    config_file::load_or_default(store)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;
    diagnostics::install_panic_handler();

    info!("╔══════════════════════════════════════╗");
    info!("║  Flood Monitor v{:<21}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    hw_init::init_peripherals()?;
    let clock = MonotonicClock::new();

    // ── 2. Config + storage ───────────────────────────────────
    let config_store = config_store();
    let config = load_config(&config_store);
    info!(
        "Device {} | storage={:?} | loop={} ms",
        config.device_id, config.storage_mode, config.control_loop_interval_ms
    );
    let mut store = storage::open_store(&config);

    // ── 3. Adapters ───────────────────────────────────────────
    let mut hw = build_hardware(clock)?;
    spawn_buzzer(clock)?;
    if let Err(e) = console_input::spawn_stdin_reader() {
        warn!("Console: reader not started ({})", e);
    }
    let mut sink = LogEventSink::new();
    let watchdog = Watchdog::default();

    // ── 4. Service ────────────────────────────────────────────
    let mut service = MonitorService::new(config.clone());
    service.start(&mut sink);
    hw.show(&DisplayText::new("System Ready", ""));
    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let cycle_delay = Duration::from_millis(u64::from(config.control_loop_interval_ms));
    loop {
        let now = clock.now_ms();

        while let Some(line) = console_input::try_next(&CONSOLE_CHANNEL) {
            let command = ConsoleCommand::parse(&line);
            let reply = console::execute(&command, &service, &mut store, &config_store, now);
            println!("{}", reply);
        }

        service.tick(now, &mut hw, &mut store, &mut sink);

        watchdog.feed();
        std::thread::sleep(cycle_delay);
    }
}

//! Console command round trips against a live service and store.

use std::fs;
use std::path::PathBuf;

use floodwatch::adapters::config_file::{self, FileConfigStore};
use floodwatch::adapters::storage::{MemoryStore, open_store};
use floodwatch::app::commands::{ConsoleCommand, HELP_TEXT};
use floodwatch::app::console;
use floodwatch::app::ports::ConfigPort;
use floodwatch::app::service::MonitorService;
use floodwatch::config::{MonitorConfig, StorageMode, fixed_str};

use super::mock_hw::{MockHardware, RecordingSink, flood, scratch_dir};

struct Console {
    svc: MonitorService,
    store: MemoryStore,
    config: FileConfigStore,
    dir: PathBuf,
}

impl Console {
    fn run(&mut self, line: &str, now: u64) -> String {
        console::execute(
            &ConsoleCommand::parse(line),
            &self.svc,
            &mut self.store,
            &self.config,
            now,
        )
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

/// A service that went Critical and saved one record at 30 s.
fn flooded(tag: &str) -> Console {
    let dir = scratch_dir(tag);
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut store = MemoryStore::new(50);
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new(flood());
    let report = svc.tick(30_000, &mut hw, &mut store, &mut sink);
    assert_eq!(report.saved.as_deref(), Some("data_30000.json"));
    Console {
        svc,
        store,
        config: FileConfigStore::new(&dir),
        dir,
    }
}

#[test]
fn status_reports_live_state() {
    let mut console = flooded("status");
    let out = console.run("STATUS", 42_500);

    assert!(out.starts_with("=== SYSTEM STATUS ==="));
    for field in [
        "Device: flood_monitor_01",
        "Uptime: 42 s",
        "Alert level: CRITICAL",
        "Records saved: 1",
        "Storage: memory",
    ] {
        assert!(out.contains(field), "missing {:?} in\n{}", field, out);
    }
}

#[test]
fn list_shows_names_sizes_and_total() {
    let mut console = flooded("list");
    let out = console.run("LIST", 31_000);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "=== RECORDS ===");
    assert!(lines[1].starts_with("data_30000.json ("));
    assert!(lines[1].ends_with(" bytes)"));
    assert!(lines[2].starts_with("Total: 1 records, "));
}

#[test]
fn get_accepts_leading_slash_and_rejects_paths() {
    let mut console = flooded("get");

    let out = console.run("GET /data_30000.json", 31_000);
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["status"]["alert_name"], "CRITICAL");

    assert_eq!(
        console.run("GET ../secrets", 31_000),
        "Error reading ../secrets: invalid record name"
    );
    assert_eq!(
        console.run("GET data_1.json", 31_000),
        "Error reading data_1.json: not found"
    );
}

#[test]
fn delete_removes_once() {
    let mut console = flooded("delete");

    assert_eq!(
        console.run("DELETE data_30000.json", 31_000),
        "Deleted data_30000.json"
    );
    assert_eq!(
        console.run("DELETE data_30000.json", 31_000),
        "Error deleting data_30000.json: not found"
    );
    assert!(console.run("LIST", 31_000).ends_with("Total: 0 records, 0 bytes"));
}

#[test]
fn unknown_or_lowercase_input_prints_help() {
    let mut console = flooded("help");
    assert_eq!(console.run("status", 31_000), HELP_TEXT);
    assert_eq!(console.run("REBOOT", 31_000), HELP_TEXT);
    assert_eq!(console.run("GET", 31_000), HELP_TEXT);
    assert_eq!(console.run("MODE SDCARD", 31_000), HELP_TEXT);
}

#[test]
fn flash_mode_selected_from_console_applies_after_restart() {
    let dir = scratch_dir("mode");
    let config = FileConfigStore::new(&dir);
    // Relative so it fits the 64-byte root field.
    let records = format!("target/floodwatch-it-mode-{}", std::process::id());
    let _ = fs::remove_dir_all(&records);
    config
        .save(&MonitorConfig {
            storage_root: fixed_str(&records),
            ..MonitorConfig::default()
        })
        .unwrap();

    // First boot runs on the memory backend.
    let booted = config_file::load_or_default(&config);
    assert_eq!(booted.storage_mode, StorageMode::Memory);
    let svc = MonitorService::new(booted);
    let mut store = MemoryStore::new(50);

    let reply = console::execute(
        &ConsoleCommand::parse("MODE FLASH"),
        &svc,
        &mut store,
        &config,
        5_000,
    );
    assert_eq!(reply, "Storage mode set to flash (applies after restart)");

    // Next boot reads the blob and opens the file store.
    let restarted = config_file::load_or_default(&config);
    assert_eq!(restarted.storage_mode, StorageMode::Flash);
    assert_eq!(restarted.storage_root.as_str(), records);
    assert_eq!(open_store(&restarted).kind(), "flash");

    let _ = fs::remove_dir_all(&records);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mode_reports_config_write_failure() {
    let dir = scratch_dir("mode-fail");
    fs::create_dir_all(&dir).unwrap();
    // A plain file where the config directory should be.
    fs::write(dir.join("blocked"), b"x").unwrap();
    let config = FileConfigStore::new(dir.join("blocked"));
    let svc = MonitorService::new(MonitorConfig::default());
    let mut store = MemoryStore::new(50);

    let reply = console::execute(
        &ConsoleCommand::parse("MODE FLASH"),
        &svc,
        &mut store,
        &config,
        5_000,
    );
    assert_eq!(reply, "Error saving config: I/O error");
    let _ = fs::remove_dir_all(&dir);
}

//! Console command execution.
//!
//! Commands operate on the record store and the stored config, and read
//! the service state; none of them reaches the classifier or changes the
//! alert level.

use core::fmt::Write;

use crate::config::{MonitorConfig, StorageMode};
use crate::monitor::context::Millis;

use super::commands::{ConsoleCommand, HELP_TEXT};
use super::ports::{ConfigPort, RecordStore};
use super::service::MonitorService;

/// Run one command and return the text to print.
pub fn execute(
    cmd: &ConsoleCommand,
    service: &MonitorService,
    store: &mut impl RecordStore,
    config: &impl ConfigPort,
    now: Millis,
) -> String {
    let mut out = String::new();
    match cmd {
        ConsoleCommand::Status => {
            let _ = write!(out, "{}", service.status(now, &*store));
        }
        ConsoleCommand::List => match store.list() {
            Ok(entries) => {
                let _ = writeln!(out, "=== RECORDS ===");
                let mut total = 0;
                for entry in &entries {
                    let _ = writeln!(out, "{} ({} bytes)", entry.name, entry.size);
                    total += entry.size;
                }
                let _ = write!(out, "Total: {} records, {} bytes", entries.len(), total);
            }
            Err(e) => {
                let _ = write!(out, "Error listing records: {}", e);
            }
        },
        ConsoleCommand::Get(name) => match store.read(name) {
            Ok(bytes) => out.push_str(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                let _ = write!(out, "Error reading {}: {}", name, e);
            }
        },
        ConsoleCommand::Delete(name) => match store.delete(name) {
            Ok(()) => {
                let _ = write!(out, "Deleted {}", name);
            }
            Err(e) => {
                let _ = write!(out, "Error deleting {}: {}", name, e);
            }
        },
        ConsoleCommand::Mode(mode) => {
            let updated = MonitorConfig {
                storage_mode: *mode,
                ..service.config().clone()
            };
            let name = match mode {
                StorageMode::Flash => "flash",
                StorageMode::Memory => "memory",
            };
            match config.save(&updated) {
                Ok(()) => {
                    let _ = write!(out, "Storage mode set to {} (applies after restart)", name);
                }
                Err(e) => {
                    let _ = write!(out, "Error saving config: {}", e);
                }
            }
        }
        ConsoleCommand::Help => out.push_str(HELP_TEXT),
    }
    out
}

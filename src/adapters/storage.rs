//! Persistence record stores.
//!
//! | Store         | Mode                  | Backing                          |
//! |---------------|-----------------------|----------------------------------|
//! | `MemoryStore` | `StorageMode::Memory` | RAM ring + pretty JSON on the log |
//! | `FileStore`   | `StorageMode::Flash`  | one `data_<boot>_<ts>.json` per record |
//!
//! Both keep at most `max_records` entries and drop the oldest first.
//! Uptime restarts at zero on every boot, so `FileStore` tags its names
//! with a boot generation one past the highest found on open; records
//! order by `(boot, ts)` across reboots.
//! On the device `FileStore` sits on the SPIFFS VFS mount, so plain
//! `std::fs` works on both targets.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app::ports::{RecordInfo, RecordStore, StorageError};
use crate::config::{MonitorConfig, StorageMode};
use crate::drivers::hw_init;
use crate::monitor::context::Millis;
use crate::record::PersistenceRecord;

const RECORD_PREFIX: &str = "data_";
const RECORD_SUFFIX: &str = ".json";

/// File name a record taken at `timestamp` is stored under in RAM.
pub fn record_name(timestamp: Millis) -> String {
    format!("{RECORD_PREFIX}{timestamp}{RECORD_SUFFIX}")
}

/// File name for a record taken at `timestamp` during boot `boot`.
pub fn boot_record_name(boot: u32, timestamp: Millis) -> String {
    format!("{RECORD_PREFIX}{boot}_{timestamp}{RECORD_SUFFIX}")
}

/// Strip one leading `/` and reject anything that could leave the
/// storage root.
pub fn normalize_name(name: &str) -> Result<&str, StorageError> {
    let name = name.strip_prefix('/').unwrap_or(name);
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(StorageError::InvalidName);
    }
    Ok(name)
}

/// `(boot, timestamp)` encoded in a record name, for oldest-first
/// ordering.  Names without a boot field sort as boot 0.
fn order_key(name: &str) -> Option<(u32, Millis)> {
    let stem = name.strip_prefix(RECORD_PREFIX)?.strip_suffix(RECORD_SUFFIX)?;
    match stem.split_once('_') {
        Some((boot, ts)) => Some((boot.parse().ok()?, ts.parse().ok()?)),
        None => Some((0, stem.parse().ok()?)),
    }
}

fn is_record(name: &str) -> bool {
    order_key(name).is_some()
}

fn encode(record: &PersistenceRecord) -> Result<Vec<u8>, StorageError> {
    record.to_json().map_err(|e| {
        warn!("Storage: encode failed: {}", e);
        StorageError::Serialization
    })
}

// ───────────────────────────────────────────────────────────────
// MemoryStore
// ───────────────────────────────────────────────────────────────

/// Development store: recent records in RAM, each one echoed to the log.
pub struct MemoryStore {
    records: VecDeque<(String, Vec<u8>)>,
    max_records: usize,
}

impl MemoryStore {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records.min(64)),
            max_records: max_records.max(1),
        }
    }
}

impl RecordStore for MemoryStore {
    fn save(&mut self, record: &PersistenceRecord) -> Result<String, StorageError> {
        let bytes = encode(record)?;
        let name = record_name(record.timestamp);

        info!(
            "Storage(memory): {}\n{}",
            name,
            String::from_utf8_lossy(&bytes)
        );

        if let Some(slot) = self.records.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = bytes;
        } else {
            self.records.push_back((name.clone(), bytes));
        }
        while self.records.len() > self.max_records {
            if let Some((dropped, _)) = self.records.pop_front() {
                debug!("Storage(memory): pruned {}", dropped);
            }
        }
        Ok(name)
    }

    fn list(&self) -> Result<Vec<RecordInfo>, StorageError> {
        Ok(self
            .records
            .iter()
            .map(|(name, bytes)| RecordInfo {
                name: name.clone(),
                size: bytes.len(),
            })
            .collect())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let name = normalize_name(name)?;
        self.records
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or(StorageError::NotFound)
    }

    fn delete(&mut self, name: &str) -> Result<(), StorageError> {
        let name = normalize_name(name)?;
        let idx = self
            .records
            .iter()
            .position(|(n, _)| n == name)
            .ok_or(StorageError::NotFound)?;
        self.records.remove(idx);
        Ok(())
    }

    fn count(&self) -> usize {
        self.records.len()
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

// ───────────────────────────────────────────────────────────────
// FileStore
// ───────────────────────────────────────────────────────────────

/// Production store: one JSON file per record under `root`.
pub struct FileStore {
    root: PathBuf,
    max_records: usize,
    boot: u32,
}

fn map_io(e: &io::Error) -> StorageError {
    match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound,
        io::ErrorKind::StorageFull => StorageError::Full,
        _ => StorageError::IoError,
    }
}

impl FileStore {
    /// Use `root` as the record directory, creating it if needed.
    pub fn open(root: impl AsRef<Path>, max_records: usize) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            warn!("Storage(file): cannot create {}: {}", root.display(), e);
            map_io(&e)
        })?;
        let mut store = Self {
            root,
            max_records: max_records.max(1),
            boot: 0,
        };
        store.boot = store
            .names()?
            .iter()
            .filter_map(|name| order_key(name))
            .map(|(boot, _)| boot)
            .max()
            .map_or(1, |last| last.saturating_add(1));
        info!(
            "Storage(file): records under {}, boot {}",
            store.root.display(),
            store.boot
        );
        Ok(store)
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(normalize_name(name)?))
    }

    /// Record names, oldest first.
    fn names(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = fs::read_dir(&self.root)
            .map_err(|e| map_io(&e))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_record(name))
            .collect();
        names.sort_by_key(|name| (order_key(name), name.clone()));
        Ok(names)
    }

    /// Drop the oldest records beyond `max_records`.  Failures are logged
    /// only; the next save retries.
    fn prune(&self) {
        let names = match self.names() {
            Ok(names) => names,
            Err(e) => {
                warn!("Storage(file): prune skipped: {}", e);
                return;
            }
        };
        let excess = names.len().saturating_sub(self.max_records);
        for name in &names[..excess] {
            match fs::remove_file(self.root.join(name)) {
                Ok(()) => debug!("Storage(file): pruned {}", name),
                Err(e) => warn!("Storage(file): prune {} failed: {}", name, e),
            }
        }
    }
}

impl RecordStore for FileStore {
    fn save(&mut self, record: &PersistenceRecord) -> Result<String, StorageError> {
        let bytes = encode(record)?;
        let name = boot_record_name(self.boot, record.timestamp);
        fs::write(self.root.join(&name), &bytes).map_err(|e| {
            warn!("Storage(file): write {} failed: {}", name, e);
            map_io(&e)
        })?;
        info!("Storage(file): saved {} ({} bytes)", name, bytes.len());
        self.prune();
        Ok(name)
    }

    fn list(&self) -> Result<Vec<RecordInfo>, StorageError> {
        self.names()?
            .into_iter()
            .map(|name| {
                let size = fs::metadata(self.root.join(&name))
                    .map_err(|e| map_io(&e))?
                    .len() as usize;
                Ok(RecordInfo { name, size })
            })
            .collect()
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.path_of(name)?).map_err(|e| map_io(&e))
    }

    fn delete(&mut self, name: &str) -> Result<(), StorageError> {
        fs::remove_file(self.path_of(name)?).map_err(|e| map_io(&e))
    }

    fn count(&self) -> usize {
        self.names().map_or(0, |names| names.len())
    }

    fn kind(&self) -> &'static str {
        "flash"
    }
}

/// Build the store selected by `config.storage_mode`.
///
/// A flash store that cannot be mounted or opened falls back to memory so
/// the monitor keeps running.
pub fn open_store(config: &MonitorConfig) -> Box<dyn RecordStore> {
    let max = usize::from(config.max_records);
    match config.storage_mode {
        StorageMode::Memory => Box::new(MemoryStore::new(max)),
        StorageMode::Flash => {
            let root = config.storage_root.as_str();
            if let Err(e) = hw_init::mount_spiffs(root) {
                warn!("Storage: {}, falling back to memory", e);
                return Box::new(MemoryStore::new(max));
            }
            match FileStore::open(root, max) {
                Ok(store) => Box::new(store),
                Err(e) => {
                    warn!("Storage: {}, falling back to memory", e);
                    Box::new(MemoryStore::new(max))
                }
            }
        }
    }
}

//! File-backed configuration store.
//!
//! Implements [`ConfigPort`] with a `postcard` blob (`monitor.cfg`) under
//! the storage root.  The blob is validated on both load and save, so a
//! config that passed [`MonitorConfig::validate`] once can't come back
//! out of storage in an invalid shape.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::MonitorConfig;

pub const CONFIG_FILE: &str = "monitor.cfg";

/// Upper bound on an accepted blob.  A valid config is well under 256 bytes.
const MAX_BLOB_SIZE: u64 = 1024;

pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(CONFIG_FILE),
        }
    }
}

fn map_io(e: &io::Error) -> ConfigError {
    match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound,
        io::ErrorKind::StorageFull => ConfigError::StorageFull,
        _ => ConfigError::IoError,
    }
}

impl ConfigPort for FileConfigStore {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let meta = fs::metadata(&self.path).map_err(|e| map_io(&e))?;
        if meta.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::Corrupted);
        }
        let bytes = fs::read(&self.path).map_err(|e| map_io(&e))?;
        let cfg: MonitorConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("Config: loaded {} ({} bytes)", self.path.display(), bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::Corrupted)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| map_io(&e))?;
        }
        fs::write(&self.path, &bytes).map_err(|e| map_io(&e))?;
        info!("Config: saved {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }
}

/// Load from `port`, falling back to defaults on first boot or a bad blob.
/// On first boot the defaults are written so later edits have a blob to
/// start from.  A bad blob is left in place.
pub fn load_or_default(port: &impl ConfigPort) -> MonitorConfig {
    match port.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound) => {
            info!("Config: none stored, writing defaults");
            let defaults = MonitorConfig::default();
            if let Err(e) = port.save(&defaults) {
                warn!("Config: cannot store defaults: {}", e);
            }
            defaults
        }
        Err(e) => {
            warn!("Config: {}, using defaults", e);
            MonitorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompositeFaultPolicy, StorageMode};

    fn scratch(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "floodwatch-cfg-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn first_boot_writes_defaults() {
        let dir = scratch("missing");
        let store = FileConfigStore::new(&dir);
        assert_eq!(store.load(), Err(ConfigError::NotFound));

        assert_eq!(load_or_default(&store), MonitorConfig::default());
        assert!(store.path.exists());
        assert_eq!(store.load(), Ok(MonitorConfig::default()));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn save_then_load() {
        let dir = scratch("roundtrip");
        let store = FileConfigStore::new(&dir);
        let cfg = MonitorConfig {
            storage_mode: StorageMode::Flash,
            composite_fault_policy: CompositeFaultPolicy::HoldLastLevel,
            water_alert_cm: 40.0,
            ..MonitorConfig::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn invalid_config_is_not_written() {
        let dir = scratch("invalid");
        let store = FileConfigStore::new(&dir);
        let cfg = MonitorConfig {
            persist_interval_ms: 0,
            ..MonitorConfig::default()
        };
        assert!(matches!(store.save(&cfg), Err(ConfigError::ValidationFailed(_))));
        assert!(!store.path.exists());
    }

    #[test]
    fn garbage_blob_is_corrupted() {
        let dir = scratch("garbage");
        fs::create_dir_all(&dir).unwrap();
        let store = FileConfigStore::new(&dir);
        fs::write(&store.path, [0xFF; 8]).unwrap();
        assert_eq!(store.load(), Err(ConfigError::Corrupted));
        assert_eq!(load_or_default(&store), MonitorConfig::default());
        let _ = fs::remove_dir_all(dir);
    }
}

//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensors, display/buzzer, event sinks, record storage)
//! implement these traits.  The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the decision core never touches hardware
//! directly.
//!
//! All port errors are typed; callers handle every variant explicitly.

use crate::config::MonitorConfig;
use crate::monitor::context::SensorSnapshot;
use crate::record::PersistenceRecord;

use super::dispatch::{AlarmPattern, DisplayText};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
///
/// Implementations must not hang: a stuck channel times out internally
/// and comes back as an invalid reading.
pub trait SensorPort {
    fn read_snapshot(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the display and the buzzer.
pub trait ActuatorPort {
    /// Replace both display lines.
    fn show(&mut self, text: &DisplayText);

    /// Start playing `pattern`.  Must return immediately; the pulses are
    /// timed by whoever sits behind the port.
    fn play_alarm(&mut self, pattern: AlarmPattern);

    /// Stop any tone in progress.
    fn silence(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Record store port (driven adapter: domain ↔ RAM / flash)
// ───────────────────────────────────────────────────────────────

/// Entry returned by [`RecordStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    pub name: String,
    pub size: usize,
}

/// Where persistence records go.  Selected at startup from
/// [`StorageMode`](crate::config::StorageMode).
///
/// Names are bare file names (`data_30000.json`); a leading `/` is
/// accepted and stripped.
pub trait RecordStore {
    /// Write a record and return the name it was stored under.
    fn save(&mut self, record: &PersistenceRecord) -> Result<String, StorageError>;

    /// All stored records, oldest first.
    fn list(&self) -> Result<Vec<RecordInfo>, StorageError>;

    /// Raw content of one record.
    fn read(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    fn delete(&mut self, name: &str) -> Result<(), StorageError>;

    /// Number of stored records.
    fn count(&self) -> usize;

    /// Short label for status output.
    fn kind(&self) -> &'static str;
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn save(&mut self, record: &PersistenceRecord) -> Result<String, StorageError> {
        (**self).save(record)
    }
    fn list(&self) -> Result<Vec<RecordInfo>, StorageError> {
        (**self).list()
    }
    fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        (**self).read(name)
    }
    fn delete(&mut self, name: &str) -> Result<(), StorageError> {
        (**self).delete(name)
    }
    fn count(&self) -> usize {
        (**self).count()
    }
    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists monitor configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  [`ConfigError::NotFound`] on first boot.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`RecordStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested record does not exist.
    NotFound,
    /// Storage medium is full.
    Full,
    /// Generic I/O error.
    IoError,
    /// Record could not be encoded.
    Serialization,
    /// Name contains a path separator or `..`.
    InvalidName,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Serialization => write!(f, "serialization failed"),
            Self::InvalidName => write!(f, "invalid record name"),
        }
    }
}

impl core::error::Error for ConfigError {}
impl core::error::Error for StorageError {}

//! Inbound console commands.
//!
//! One line of text per command.  Verbs are upper-case and matched
//! exactly; anything unrecognised becomes [`ConsoleCommand::Help`].

use crate::config::StorageMode;

/// Commands the serial/stdin console can send into the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Device id, uptime, alert level, record count, storage backend.
    Status,
    /// Every stored record with its size, plus a total.
    List,
    /// Print the content of one record.
    Get(String),
    /// Remove one record.
    Delete(String),
    /// Store a new storage backend in the config blob.  Applies on the
    /// next boot.
    Mode(StorageMode),
    /// Print the command list.
    Help,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.split_once(' ') {
            Some(("GET", name)) if !name.trim().is_empty() => Self::Get(name.trim().into()),
            Some(("DELETE", name)) if !name.trim().is_empty() => Self::Delete(name.trim().into()),
            Some(("MODE", mode)) => match mode.trim() {
                "FLASH" => Self::Mode(StorageMode::Flash),
                "MEMORY" => Self::Mode(StorageMode::Memory),
                _ => Self::Help,
            },
            _ => match line {
                "STATUS" => Self::Status,
                "LIST" => Self::List,
                _ => Self::Help,
            },
        }
    }
}

pub const HELP_TEXT: &str = "\
Available commands:
  STATUS         - system status
  LIST           - list stored records
  GET <name>     - print a record
  DELETE <name>  - delete a record
  MODE <FLASH|MEMORY> - storage backend after restart";

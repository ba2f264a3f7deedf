//! Line-oriented serial console input.
//!
//! A reader thread reads stdin (UART0 via the VFS on the device, the
//! terminal on the host) and forwards each non-empty line to
//! [`CONSOLE_CHANNEL`].  The control loop drains the channel with
//! [`try_next`] at the top of every cycle and never waits on input.
//!
//! The device VFS only blocks once `hw_init` has installed the UART
//! driver; before that, reads return `WouldBlock` or EOF, which the
//! reader waits out instead of exiting.

use std::io::{self, BufRead};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::config::fixed_str;
use crate::drivers::task_pin::{self, Core};

/// Longest accepted command line; longer input is cut.
pub const CONSOLE_LINE_LEN: usize = 64;
pub const CONSOLE_DEPTH: usize = 4;

/// Back-off while the input has nothing to give.
const IDLE_POLL: Duration = Duration::from_millis(20);

pub type ConsoleLine = heapless::String<CONSOLE_LINE_LEN>;
pub type ConsoleChannel = Channel<CriticalSectionRawMutex, ConsoleLine, CONSOLE_DEPTH>;

/// Reader thread → control loop.
pub static CONSOLE_CHANNEL: ConsoleChannel = Channel::new();

/// Queue one line.  Blank lines are dropped.  Returns `false` if the queue
/// was full and the line was discarded.
pub fn push_line(channel: &ConsoleChannel, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return true;
    }
    if channel.try_send(fixed_str(line)).is_err() {
        warn!("Console: input queue full, dropping '{}'", line);
        return false;
    }
    true
}

/// Next pending line, if any.  Never blocks.
pub fn try_next(channel: &ConsoleChannel) -> Option<ConsoleLine> {
    channel.try_receive().ok()
}

/// Forward lines from `reader` until EOF.  `WouldBlock` and partial
/// lines are retried after [`IDLE_POLL`]; undecodable lines are skipped.
/// Returns the number of lines read.
pub fn pump_lines(mut reader: impl BufRead, channel: &ConsoleChannel) -> io::Result<usize> {
    let mut buf = String::new();
    let mut lines = 0;
    loop {
        match reader.read_line(&mut buf) {
            Ok(0) => {
                if !buf.is_empty() {
                    push_line(channel, &buf);
                    lines += 1;
                }
                return Ok(lines);
            }
            Ok(_) if buf.ends_with('\n') => {
                push_line(channel, &buf);
                buf.clear();
                lines += 1;
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => std::thread::sleep(IDLE_POLL),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Console: skipping undecodable input");
                buf.clear();
            }
            Err(e) => return Err(e),
        }
    }
}

/// Start the stdin reader thread feeding [`CONSOLE_CHANNEL`].
pub fn spawn_stdin_reader() -> std::io::Result<()> {
    task_pin::spawn_on_core(Core::App, 3, 4, "console\0", || {
        loop {
            match pump_lines(io::stdin().lock(), &CONSOLE_CHANNEL) {
                Ok(_) if cfg!(target_os = "espidf") => std::thread::sleep(IDLE_POLL),
                Ok(_) => break,
                Err(e) => {
                    warn!("Console: read error: {}", e);
                    break;
                }
            }
        }
        info!("Console: input closed");
    })?;
    Ok(())
}

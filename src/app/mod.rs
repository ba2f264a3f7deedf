//! Application core: decision logic, zero I/O.
//!
//! Classification, transition detection and cadence gating live in
//! [`crate::risk`], [`crate::monitor`] and [`crate::scheduler`]; this module
//! wires them into one cycle ([`service`]), turns decisions into output
//! values ([`dispatch`]), and defines the **port traits** ([`ports`]) that
//! keep every hardware interaction outside the core.

pub mod commands;
pub mod console;
pub mod dispatch;
pub mod events;
pub mod ports;
pub mod service;

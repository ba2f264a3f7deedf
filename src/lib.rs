//! Flood monitor firmware library.
//!
//! Exposes the decision core (classification, alert state, cadence gates,
//! actuation and record building) plus the drivers and adapters around it
//! for integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod monitor;
pub mod pins;
pub mod record;
pub mod risk;
pub mod scheduler;
pub mod sensors;

#[cfg(target_os = "espidf")]
mod esp_link_shims;

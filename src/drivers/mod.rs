//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod buzzer;
pub mod hw_init;
pub mod lcd;
pub mod task_pin;
pub mod watchdog;

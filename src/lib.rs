//! SmartCollar firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod modem;
pub mod network;
pub mod pins;
pub mod session;
pub mod tracker;

// Adapters and drivers carry both the ESP-IDF implementation and the
// host simulation; each is selected by cfg inside the module.
pub mod adapters;
pub mod drivers;

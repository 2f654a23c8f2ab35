//! EdgePilot firmware library.
//!
//! Exposes the control loop, its ports and the board adapters for
//! integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; on other targets
//! the adapters fall back to simulation.

#![deny(unused_must_use)]

pub mod actuation;
pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod oracle;
pub mod pins;
pub mod safety;
pub mod sensors;

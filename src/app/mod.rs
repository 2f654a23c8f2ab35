//! Application core: pure domain logic, zero I/O.
//!
//! The per-cycle rules of the vehicle: sense, brake or drive, settle.
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod control_loop;
pub mod events;
pub mod ports;

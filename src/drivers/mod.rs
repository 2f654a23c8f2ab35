//! Actuator drivers, camera bring-up, GPIO initialisation and the
//! task watchdog.

pub mod brake_led;
pub mod camera;
pub mod hw_init;
pub mod motor;
pub mod steering;
pub mod watchdog;

//! One-shot GPIO initialization and raw line access.
//!
//! Configures the ultrasonic, motor, steering and brake-LED lines using
//! raw ESP-IDF sys calls.  Called once from `main()` before the camera is
//! brought up.  On the host every line is simulated in memory so drivers
//! and adapters can be exercised without hardware.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

use crate::error::InitError;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), InitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_gpio_inputs()?;
    }
    info!("hw_init: GPIO configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), InitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), InitError> {
    for &pin in &pins::OUTPUT_PINS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(InitError::Gpio(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), InitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ECHO_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(InitError::Gpio(ret));
    }
    Ok(())
}

// ── Raw line access ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output pin configured in
    // init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::cell::RefCell;
    use std::collections::HashMap;

    thread_local! {
        static LEVELS: RefCell<HashMap<i32, bool>> = RefCell::new(HashMap::new());
    }

    pub fn write(pin: i32, high: bool) {
        LEVELS.with(|l| {
            l.borrow_mut().insert(pin, high);
        });
    }

    pub fn read(pin: i32) -> bool {
        LEVELS.with(|l| l.borrow().get(&pin).copied().unwrap_or(false))
    }
}

/// Simulation: stores the level per pin (thread-local).
#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::write(pin, high);
}

/// Simulation: reads back the last written level, LOW if never written.
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::read(pin)
}

// ── embedded-hal wrappers ─────────────────────────────────────

/// A configured output line.  Remembers the last written level.
#[derive(Debug)]
pub struct GpioOutput {
    pin: i32,
    high: bool,
}

impl GpioOutput {
    /// Wrap a pin that `init_peripherals()` configured as an output.
    /// Lines start LOW.
    pub fn new(pin: i32) -> Self {
        Self { pin, high: false }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Infallible> {
        gpio_write(self.pin, false);
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        gpio_write(self.pin, true);
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for GpioOutput {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }
}

/// A configured input line.
#[derive(Debug)]
pub struct GpioInput {
    pin: i32,
}

impl GpioInput {
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl ErrorType for GpioInput {
    type Error = Infallible;
}

impl InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(gpio_read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!gpio_read(self.pin))
    }
}

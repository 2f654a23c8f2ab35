//! Time and delay adapters.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` (µs, monotonic)
//!   and `esp_idf_hal::delay::Delay`, which busy-waits short delays and
//!   yields to FreeRTOS for long ones.
//! - **other targets**: `std::time::Instant` and `std::thread::sleep`.

use embedded_hal::delay::DelayNs;

use crate::app::ports::TimePort;

/// Monotonic clock for the ESP32 platform.
#[derive(Clone)]
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: reads the high-resolution timer counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the adapter was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl TimePort for Esp32TimeAdapter {
    fn now_us(&self) -> u64 {
        self.uptime_us()
    }
}

/// Blocking delay used for the trigger pulse and the cycle pauses.
pub struct SystemDelay {
    #[cfg(target_os = "espidf")]
    inner: esp_idf_hal::delay::Delay,
}

impl Default for SystemDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemDelay {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            inner: esp_idf_hal::delay::Delay::new_default(),
        }
    }
}

impl DelayNs for SystemDelay {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        self.inner.delay_ns(ns);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        self.inner.delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

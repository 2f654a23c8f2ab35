//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stalls.  The window comes from
//! `SystemConfig::watchdog_timeout_ms`, which `validate()` keeps longer
//! than `SystemConfig::worst_cycle_ms()`, so an oracle timeout never
//! trips it.  `feed()` is called once per cycle.
//!
//! The halt path after a fatal init error never creates a `Watchdog`, so
//! a halted device stays halted instead of reboot-looping.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

pub struct Watchdog {
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    #[cfg(target_os = "espidf")]
    pub fn subscribe(timeout_ms: u32) -> Self {
        // SAFETY: TWDT calls from the main task during startup.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK as i32 {
                warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            let subscribed = ret == ESP_OK as i32;
            if subscribed {
                info!("Watchdog: subscribed ({} ms, panic on trigger)", timeout_ms);
            } else {
                warn!("Watchdog: failed to subscribe ({})", ret);
            }
            Self { subscribed }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn subscribe(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): {} ms window, no-op", timeout_ms);
        Self { subscribed: true }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Feed the watchdog once per cycle.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the calling task subscribed in `subscribe()`.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

//! System configuration parameters
//!
//! All tunable parameters for the EdgePilot control loop.  The values are
//! compiled in: `SystemConfig::default()` is the production configuration,
//! and the struct is handed to [`ControlLoop::new`](crate::app::control_loop::ControlLoop::new)
//! once at boot and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Longest a frame capture can block (`esp_camera_fb_get` gives up after 4 s).
pub const FRAME_CAPTURE_MAX_MS: u32 = 4_000;

/// Network phases bounded separately by the HTTP timeout: connect, request
/// write, response read.
pub const HTTP_TIMEOUT_PHASES: u32 = 3;

/// Slack between the slowest possible cycle and the watchdog window.
pub const WATCHDOG_MARGIN_MS: u32 = 5_000;

/// Camera frame resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameSize {
    /// 320 × 240
    Qvga,
    /// 400 × 296
    Cif,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Safety ---
    /// Distance (cm) at or below which the vehicle brakes
    pub brake_distance_cm: i32,
    /// How long the motor runs in reverse during a brake manoeuvre (ms)
    pub reverse_ms: u32,
    /// Pause after the brake manoeuvre before the next cycle (ms)
    pub brake_settle_ms: u32,

    // --- Timing ---
    /// Settling pause at the end of every drive cycle (ms)
    pub cycle_settle_ms: u32,
    /// Pause after a failed frame capture (ms)
    pub frame_retry_pause_ms: u32,
    /// Upper bound on the echo wait, rising edge plus pulse width (µs)
    pub echo_timeout_us: u32,

    // --- Network ---
    pub wifi_ssid: String,
    pub wifi_password: String,
    /// Oracle endpoint; frames are POSTed here
    pub oracle_url: String,
    /// Connect + response timeout for one oracle exchange (ms)
    pub http_timeout_ms: u32,

    // --- Camera ---
    /// Frame size / JPEG quality / buffer count when PSRAM is fitted
    pub frame_size_psram: FrameSize,
    pub jpeg_quality_psram: u8,
    pub frame_buffers_psram: u8,
    /// Fallback settings for boards without PSRAM
    pub frame_size_dram: FrameSize,
    pub jpeg_quality_dram: u8,
    pub frame_buffers_dram: u8,

    // --- Telemetry ---
    /// Emit a telemetry snapshot every N cycles (0 = never)
    pub telemetry_interval_cycles: u32,

    // --- Supervision ---
    /// Task watchdog window (ms); fed once per cycle
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Safety
            brake_distance_cm: 20,
            reverse_ms: 400,
            brake_settle_ms: 500,

            // Timing
            cycle_settle_ms: 200,
            frame_retry_pause_ms: 200,
            echo_timeout_us: 30_000, // ~5 m of range

            // Network
            wifi_ssid: String::from("YOUR_WIFI"),
            wifi_password: String::from("YOUR_PASS"),
            oracle_url: String::from("https://bvcantcode-edgelords.hf.space/predict"),
            http_timeout_ms: 10_000,

            // Camera
            frame_size_psram: FrameSize::Qvga,
            jpeg_quality_psram: 10,
            frame_buffers_psram: 2,
            frame_size_dram: FrameSize::Cif,
            jpeg_quality_dram: 12,
            frame_buffers_dram: 1,

            // Telemetry
            telemetry_interval_cycles: 50, // ~10 s at the 200 ms settle

            // Supervision: slowest cycle is a drive cycle whose oracle
            // call times out in every phase (~34 s), plus margin
            watchdog_timeout_ms: 40_000,
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the loop unsafe or unable to run.
    pub fn validate(&self) -> Result<(), Error> {
        if self.brake_distance_cm <= 0 {
            return Err(Error::Config("brake_distance_cm must be positive"));
        }
        if self.reverse_ms == 0 {
            return Err(Error::Config("reverse_ms must be non-zero"));
        }
        if self.echo_timeout_us == 0 {
            return Err(Error::Config("echo_timeout_us must be non-zero"));
        }
        if self.http_timeout_ms == 0 {
            return Err(Error::Config("http_timeout_ms must be non-zero"));
        }
        if self.oracle_url.is_empty() {
            return Err(Error::Config("oracle_url is empty"));
        }
        // OV2640 JPEG quality: 0 (best) .. 63 (worst)
        if self.jpeg_quality_psram > 63 || self.jpeg_quality_dram > 63 {
            return Err(Error::Config("jpeg quality out of range (0-63)"));
        }
        if self.frame_buffers_psram == 0 || self.frame_buffers_dram == 0 {
            return Err(Error::Config("at least one frame buffer required"));
        }
        if u64::from(self.watchdog_timeout_ms)
            < self.worst_cycle_ms() + u64::from(WATCHDOG_MARGIN_MS)
        {
            return Err(Error::Config("watchdog_timeout_ms shorter than the slowest cycle"));
        }
        Ok(())
    }

    /// Upper bound on one control cycle (ms), between two watchdog feeds.
    pub fn worst_cycle_ms(&self) -> u64 {
        let echo = u64::from(self.echo_timeout_us.div_ceil(1_000));
        let brake = u64::from(self.reverse_ms) + u64::from(self.brake_settle_ms);
        let no_frame = u64::from(FRAME_CAPTURE_MAX_MS) + u64::from(self.frame_retry_pause_ms);
        let drive = u64::from(FRAME_CAPTURE_MAX_MS)
            + u64::from(HTTP_TIMEOUT_PHASES) * u64::from(self.http_timeout_ms)
            + u64::from(self.cycle_settle_ms);
        echo + brake.max(no_frame).max(drive)
    }

    /// Copy safe to log: the WiFi password is masked.
    pub fn redacted(&self) -> Self {
        Self {
            wifi_password: "***".into(),
            ..self.clone()
        }
    }
}

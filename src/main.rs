//! EdgePilot Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      CameraSource     LogEventSink            │
//! │  (Proximity+Actuator) (FrameSource)    (EventSink)             │
//! │  OracleClient ── HttpTransport + WifiAdapter                   │
//! │  (OraclePort)    (HttpPort)      (ConnectivityPort)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  BrakePolicy · Command mapping · ActuationState        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use edgepilot::adapters::camera::CameraSource;
use edgepilot::adapters::hardware::BoardHardware;
use edgepilot::adapters::http::HttpTransport;
use edgepilot::adapters::log_sink::LogEventSink;
use edgepilot::adapters::time::{Esp32TimeAdapter, SystemDelay};
use edgepilot::adapters::wifi::WifiAdapter;
use edgepilot::app::control_loop::ControlLoop;
use edgepilot::app::ports::TimePort;
use edgepilot::config::SystemConfig;
use edgepilot::drivers::{camera, hw_init};
use edgepilot::drivers::watchdog::Watchdog;
use edgepilot::error::{Error, InitError};

/// Interval between repeats of the halt message.
const HALT_REPORT_MS: u64 = 1_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EdgePilot v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // Give the serial monitor time to attach.
    std::thread::sleep(std::time::Duration::from_millis(2_000));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;
    info!("Config: {}", serde_json::to_string(&config.redacted())?);

    // ── 3. GPIO + neutral posture ─────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    let mut hw = BoardHardware::from_board(&config);
    let mut sink = LogEventSink::new();
    let mut control = ControlLoop::new(config.clone());
    control.start(&mut hw, &mut sink);

    // ── 4. Camera ─────────────────────────────────────────────
    if let Err(e) = camera::init_camera(&config) {
        if e.is_fatal() {
            control.halt(e, &mut hw, &mut sink);
            halt(e);
        }
        return Err(Error::from(e).into());
    }

    // ── 5. WiFi (blocks until associated) ─────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();
    let mut wifi = WifiAdapter::new(
        peripherals.modem,
        sysloop,
        nvs,
        &config.wifi_ssid,
        &config.wifi_password,
    )
    .map_err(Error::from)?;
    wifi.connect_blocking().map_err(Error::from)?;

    // ── 6. Wire the loop ──────────────────────────────────────
    let http = HttpTransport::new(&config).map_err(Error::from)?;
    let mut oracle = edgepilot::oracle::OracleClient::new(http, wifi);
    let mut frames = CameraSource::new();
    let mut delay = SystemDelay::new();
    let clock = Esp32TimeAdapter::new();
    let watchdog = Watchdog::subscribe(config.watchdog_timeout_ms);

    info!(
        "System ready. Oracle at {} (watchdog {} ms, slowest cycle {} ms)",
        oracle.http().url(),
        config.watchdog_timeout_ms,
        config.worst_cycle_ms()
    );

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        control.run_cycle(&mut hw, &mut frames, &mut oracle, &mut delay, &mut sink);
        oracle.link_mut().poll(clock.now_us());
        watchdog.feed();
    }
}

/// Park the main task forever, repeating the cause once per second.
/// Actuators already hold the fault posture; the watchdog is not
/// subscribed, so the device stays here until power-cycled.
fn halt(cause: InitError) -> ! {
    loop {
        error!("Halted: {}", cause);
        std::thread::sleep(std::time::Duration::from_millis(HALT_REPORT_MS));
    }
}

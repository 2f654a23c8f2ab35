//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the link-state probe the oracle client
//! consults before every request.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` over
//!   `EspWifi`.
//! - **all other targets**: a simulated link for host-side tests.
//!
//! ## Reconnection policy
//!
//! Startup blocks until the first association succeeds.  After that,
//! [`poll`](WifiAdapter::poll) runs once per cycle; when the link is down
//! it re-issues a non-blocking connect after an exponential backoff
//! (2 s → 4 s → 8 s … capped at 60 s).  The control loop never waits on
//! the link: while it is down every Drive cycle falls back to `FORWARD`.

use log::{info, warn};

use crate::app::ports::ConnectivityPort;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::eventloop::EspSystemEventLoop;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::modem::Modem;
#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::EspDefaultNvsPartition;
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;
/// Pause between association checks during the blocking startup connect.
const STARTUP_RETRY_MS: u64 = 500;
/// Re-issue the connect request every this many startup checks (10 s).
const STARTUP_RECONNECT_EVERY: u32 = 20;

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    backoff_secs: u32,
    next_attempt_us: u64,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_connect_calls: u32,
}

impl WifiAdapter {
    /// Create the driver and apply station credentials.  Does not connect.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        ssid: &str,
        password: &str,
    ) -> Result<Self, CommsError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs).map_err(|e| {
            warn!("WiFi: driver init failed: {}", e);
            CommsError::WifiConnectFailed
        })?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop).map_err(|e| {
            warn!("WiFi: event loop wrap failed: {}", e);
            CommsError::WifiConnectFailed
        })?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            password: password
                .try_into()
                .map_err(|_| CommsError::WifiConnectFailed)?,
            auth_method,
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client))
            .map_err(|e| {
                warn!("WiFi: configuration rejected: {}", e);
                CommsError::WifiConnectFailed
            })?;

        Ok(Self {
            state: WifiState::Disconnected,
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt_us: 0,
            wifi,
        })
    }

    /// Simulated adapter; the link starts down.
    #[cfg(not(target_os = "espidf"))]
    pub fn new_sim() -> Self {
        Self {
            state: WifiState::Disconnected,
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt_us: 0,
            sim_link_up: false,
            sim_connect_calls: 0,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn backoff_secs(&self) -> u32 {
        self.backoff_secs
    }

    /// Block until associated, checking every 500 ms.
    pub fn connect_blocking(&mut self) -> Result<(), CommsError> {
        self.platform_start()?;
        info!("WiFi: connecting");
        let mut attempt: u32 = 0;
        loop {
            if attempt % STARTUP_RECONNECT_EVERY == 0 {
                if let Err(e) = self.platform_connect() {
                    warn!("WiFi: connect request failed: {}", e);
                }
            }
            if self.platform_is_connected() {
                break;
            }
            attempt = attempt.wrapping_add(1);
            std::thread::sleep(std::time::Duration::from_millis(STARTUP_RETRY_MS));
        }
        self.state = WifiState::Connected;
        self.backoff_secs = INITIAL_BACKOFF_SECS;
        info!("WiFi: connected after {} retries", attempt);
        Ok(())
    }

    /// Track link state and drive reconnects.  Call once per cycle.
    pub fn poll(&mut self, now_us: u64) {
        let up = self.platform_is_connected();
        match self.state {
            WifiState::Connected if !up => {
                warn!("WiFi: connection lost, entering reconnect");
                self.state = WifiState::Reconnecting { attempt: 0 };
                self.backoff_secs = INITIAL_BACKOFF_SECS;
                self.next_attempt_us = now_us;
            }
            WifiState::Reconnecting { .. } | WifiState::Disconnected if up => {
                info!("WiFi: reconnected");
                self.state = WifiState::Connected;
                self.backoff_secs = INITIAL_BACKOFF_SECS;
            }
            _ => {}
        }

        if let WifiState::Reconnecting { attempt } = self.state {
            if now_us < self.next_attempt_us {
                return;
            }
            info!("WiFi: reconnect attempt {} (backoff {}s)", attempt, self.backoff_secs);
            if let Err(e) = self.platform_connect() {
                warn!("WiFi: reconnect request failed: {}", e);
            }
            self.next_attempt_us = now_us + u64::from(self.backoff_secs) * 1_000_000;
            self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
            self.state = WifiState::Reconnecting {
                attempt: attempt.saturating_add(1),
            };
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        self.wifi.start().map_err(|e| {
            warn!("WiFi: start failed: {}", e);
            CommsError::WifiConnectFailed
        })
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        // Non-blocking: association completes in the background.
        self.wifi
            .wifi_mut()
            .connect()
            .map_err(|_| CommsError::WifiConnectFailed)
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.sim_connect_calls += 1;
        self.sim_link_up = true;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    /// Simulation: force the link up or down.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_connect_calls(&self) -> u32 {
        self.sim_connect_calls
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

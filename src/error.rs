//! Unified error types for the EdgePilot firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the control loop's error handling uniform.  All variants are `Copy` so
//! they can be passed through the cycle and into diagnostics without
//! allocation.
//!
//! Only [`InitError::Camera`] is fatal.  Everything else is recovered
//! inside the cycle that produced it.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The proximity sensor produced no usable measurement.
    Sensor(SensorError),
    /// The frame source had no buffer to hand out.
    Frame(FrameError),
    /// Network association or the oracle exchange failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(InitError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No echo pulse arrived inside the timeout window.
    EchoTimeout,
    /// Driving the trigger line failed.
    TriggerFailed,
    /// Reading the echo line failed.
    EchoReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EchoTimeout => write!(f, "no echo within timeout"),
            Self::TriggerFailed => write!(f, "trigger write failed"),
            Self::EchoReadFailed => write!(f, "echo read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The camera returned no buffer (exhausted or busy).
    Unavailable,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "no frame buffer available"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// No wireless association; no call was attempted.
    NotAssociated,
    /// The TCP/TLS connection could not be established.
    Connect,
    /// The exchange did not complete within the transport timeout.
    Timeout,
    /// The server answered with a non-success HTTP status.
    Status(u16),
    /// Any other transport-level I/O failure.
    Io,
    /// WiFi station association failed.
    WifiConnectFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAssociated => write!(f, "WiFi not associated"),
            Self::Connect => write!(f, "connection failed"),
            Self::Timeout => write!(f, "transport timeout"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Io => write!(f, "transport I/O error"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Initialisation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// `esp_camera_init` returned the given error code.  Fatal.
    Camera(i32),
    /// GPIO configuration returned the given error code.
    Gpio(i32),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera(rc) => write!(f, "camera init failed (err=0x{rc:x})"),
            Self::Gpio(rc) => write!(f, "GPIO config failed (rc={rc})"),
        }
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl InitError {
    /// Whether the system can keep running after this error.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Camera(_))
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

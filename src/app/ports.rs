//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensor, actuators, camera, oracle, event sinks)
//! implement these traits.  The [`ControlLoop`](super::control_loop::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly.  Timing goes through `embedded_hal::delay::DelayNs` plus
//! [`TimePort`].

use crate::actuation::{PropulsionState, SteerState};
use crate::error::{CommsError, FrameError};
use crate::oracle::OracleReply;
use crate::sensors::DistanceSample;

use super::commands::is_padding;
use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Proximity measurement.  Bounded: returns [`DistanceSample::NoEcho`]
/// instead of waiting past the echo timeout.
pub trait ProximityPort {
    fn measure_distance(&mut self) -> DistanceSample;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.  Every call is immediate and idempotent: asking for
/// the state an axis is already in changes nothing on the lines.
pub trait ActuatorPort {
    fn set_propulsion(&mut self, state: PropulsionState);

    fn set_steering(&mut self, state: SteerState);

    fn set_brake_indicator(&mut self, on: bool);

    /// Stop, straighten, indicator off.
    fn all_off(&mut self) {
        self.set_propulsion(PropulsionState::Stopped);
        self.set_steering(SteerState::Straight);
        self.set_brake_indicator(false);
    }
}

// ───────────────────────────────────────────────────────────────
// Frame source (external collaborator: camera)
// ───────────────────────────────────────────────────────────────

/// Hands out encoded image buffers.  Every buffer returned by
/// [`acquire`](FrameSource::acquire) must go back through
/// [`release`](FrameSource::release) before the next acquire; the control
/// loop guarantees this with [`FrameLease`].
pub trait FrameSource {
    type Frame: AsRef<[u8]>;

    fn acquire(&mut self) -> Result<Self::Frame, FrameError>;

    fn release(&mut self, frame: Self::Frame);
}

/// Scope-bound ownership of one frame.  Dropping the lease returns the
/// buffer to its source, whichever way the cycle exits.
pub struct FrameLease<'a, S: FrameSource> {
    source: &'a mut S,
    frame: Option<S::Frame>,
}

impl<'a, S: FrameSource> FrameLease<'a, S> {
    pub fn acquire(source: &'a mut S) -> Result<Self, FrameError> {
        let frame = source.acquire()?;
        Ok(Self {
            source,
            frame: Some(frame),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.frame {
            Some(frame) => frame.as_ref(),
            None => &[],
        }
    }
}

impl<S: FrameSource> Drop for FrameLease<'_, S> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.source.release(frame);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Oracle port (external collaborator: remote classifier)
// ───────────────────────────────────────────────────────────────

/// Asks the remote oracle for a steering command.  Never fails: the
/// reply always carries a usable command, falling back to `Forward`.
pub trait OraclePort {
    fn request_command(&mut self, frame: &[u8]) -> OracleReply;
}

// ───────────────────────────────────────────────────────────────
// Network ports (used by the oracle client)
// ───────────────────────────────────────────────────────────────

/// Capacity of the response body buffer, measured after padding is
/// stripped.  A command token is at most seven bytes; a trimmed body
/// longer than this cannot be a valid reply.
pub const MAX_RESPONSE_LEN: usize = 64;

/// Transports stop reading after this many raw body bytes.  Anything
/// longer is flagged as truncated.
pub const MAX_BODY_READ: usize = 16 * 1024;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Body with leading and trailing padding stripped, capped at
    /// [`MAX_RESPONSE_LEN`] bytes.
    pub body: heapless::Vec<u8, MAX_RESPONSE_LEN>,
    /// The trimmed body did not fit in `body`, or the raw body exceeded
    /// [`MAX_BODY_READ`].  `body` then holds only a prefix.
    pub truncated: bool,
}

impl HttpResponse {
    /// Build from a complete in-memory body.
    pub fn new(status: u16, body: &[u8]) -> Self {
        let mut collector = BodyCollector::new();
        collector.push(body);
        collector.finish(status)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Incremental body reader.  Strips [`is_padding`] bytes from both ends as
/// chunks arrive, so padding of any length never crowds out a token.
#[derive(Debug, Default)]
pub struct BodyCollector {
    body: heapless::Vec<u8, MAX_RESPONSE_LEN>,
    /// Padding seen after content; kept only if more content follows.
    pending: usize,
    started: bool,
    overflow: bool,
}

impl BodyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        for &b in chunk {
            if is_padding(b) {
                if self.started {
                    self.pending += 1;
                }
                continue;
            }
            self.started = true;
            if self.overflow {
                continue;
            }
            // Interior padding is kept as spaces; it already rules out a token.
            if self.body.len() + self.pending + 1 > MAX_RESPONSE_LEN {
                self.overflow = true;
                continue;
            }
            for _ in 0..self.pending {
                let _ = self.body.push(b' ');
            }
            self.pending = 0;
            let _ = self.body.push(b);
        }
    }

    /// The transport gave up before the end of the body.
    pub fn mark_truncated(&mut self) {
        self.overflow = true;
    }

    pub fn finish(self, status: u16) -> HttpResponse {
        HttpResponse {
            status,
            body: self.body,
            truncated: self.overflow,
        }
    }
}

/// One-shot HTTP POST to the configured endpoint.  Implementations bound
/// the whole exchange by their configured timeout.
pub trait HttpPort {
    fn post(&mut self, content_type: &str, body: &[u8]) -> Result<HttpResponse, CommsError>;
}

/// Wireless association state.
pub trait ConnectivityPort {
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic microsecond clock.
pub trait TimePort {
    fn now_us(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

//! Mock adapters for integration tests.
//!
//! Record every actuator call, frame acquire/release and HTTP request so
//! tests can assert on the full history without touching real GPIO, the
//! camera or the network.

use std::collections::VecDeque;

use edgepilot::actuation::{PropulsionState, SteerState};
use edgepilot::app::events::AppEvent;
use edgepilot::app::ports::{
    ActuatorPort, ConnectivityPort, EventSink, FrameSource, HttpPort, HttpResponse, ProximityPort,
};
use edgepilot::error::{CommsError, FrameError};
use edgepilot::oracle::OracleClient;
use edgepilot::sensors::DistanceSample;
use embedded_hal::delay::DelayNs;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Propulsion(PropulsionState),
    Steering(SteerState),
    BrakeIndicator(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Proximity + actuators.  Distances are served from a queue; once it
/// runs dry the last value repeats.
pub struct MockHardware {
    distances: VecDeque<i32>,
    last_distance: i32,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(distances: &[i32]) -> Self {
        Self {
            distances: distances.iter().copied().collect(),
            last_distance: distances.last().copied().unwrap_or(-1),
            calls: Vec::new(),
        }
    }

    pub fn propulsion(&self) -> PropulsionState {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Propulsion(p) => Some(*p),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn steering(&self) -> SteerState {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Steering(s) => Some(*s),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn brake_indicator(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::BrakeIndicator(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn propulsion_history(&self) -> Vec<PropulsionState> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Propulsion(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl ProximityPort for MockHardware {
    fn measure_distance(&mut self) -> DistanceSample {
        let raw = self.distances.pop_front().unwrap_or(self.last_distance);
        DistanceSample::from_raw(raw)
    }
}

impl ActuatorPort for MockHardware {
    fn set_propulsion(&mut self, state: PropulsionState) {
        self.calls.push(ActuatorCall::Propulsion(state));
    }

    fn set_steering(&mut self, state: SteerState) {
        self.calls.push(ActuatorCall::Steering(state));
    }

    fn set_brake_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::BrakeIndicator(on));
    }
}

// ── MockFrames ────────────────────────────────────────────────

/// Counts acquisitions and releases; `fail` makes acquire return nothing.
#[derive(Default)]
pub struct MockFrames {
    pub fail: bool,
    pub acquired: u32,
    pub released: u32,
}

#[allow(dead_code)]
impl MockFrames {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn outstanding(&self) -> u32 {
        self.acquired - self.released
    }
}

impl FrameSource for MockFrames {
    type Frame = Vec<u8>;

    fn acquire(&mut self) -> Result<Vec<u8>, FrameError> {
        if self.fail {
            return Err(FrameError::Unavailable);
        }
        assert_eq!(self.outstanding(), 0, "previous frame was never released");
        self.acquired += 1;
        Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
    }

    fn release(&mut self, _frame: Vec<u8>) {
        self.released += 1;
    }
}

// ── MockHttp / MockLink ───────────────────────────────────────

/// Serves scripted replies in order, repeating the last one.
pub struct MockHttp {
    replies: VecDeque<Result<HttpResponse, CommsError>>,
    last: Result<HttpResponse, CommsError>,
    pub requests: Vec<(String, usize)>,
}

#[allow(dead_code)]
impl MockHttp {
    pub fn answering(body: &str) -> Self {
        Self::scripted(vec![Ok(HttpResponse::new(200, body.as_bytes()))])
    }

    pub fn failing(e: CommsError) -> Self {
        Self::scripted(vec![Err(e)])
    }

    pub fn scripted(replies: Vec<Result<HttpResponse, CommsError>>) -> Self {
        let last = replies
            .last()
            .cloned()
            .unwrap_or(Err(CommsError::Io));
        Self {
            replies: replies.into(),
            last,
            requests: Vec::new(),
        }
    }
}

impl HttpPort for MockHttp {
    fn post(&mut self, content_type: &str, body: &[u8]) -> Result<HttpResponse, CommsError> {
        self.requests.push((content_type.to_owned(), body.len()));
        self.replies.pop_front().unwrap_or_else(|| self.last.clone())
    }
}

pub struct MockLink(pub bool);

impl ConnectivityPort for MockLink {
    fn is_connected(&self) -> bool {
        self.0
    }
}

pub type MockOracle = OracleClient<MockHttp, MockLink>;

// ── MockDelay ─────────────────────────────────────────────────

/// Accumulates requested delay instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

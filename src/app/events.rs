//! Outbound application events.
//!
//! The [`ControlLoop`](super::control_loop::ControlLoop) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them, e.g. log them to serial.

use crate::actuation::ActuationState;
use crate::app::commands::Command;
use crate::error::InitError;
use crate::oracle::ReplyOrigin;
use crate::sensors::DistanceSample;
use crate::sensors::grade::ProximityGrade;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The loop has started (carries the initial actuation posture).
    Started(ActuationState),

    /// A proximity sample was taken at the start of a cycle.
    Distance(DistanceSample),

    /// The brake manoeuvre ran for an obstacle at `distance_cm`.
    BrakeEngaged { distance_cm: i32 },

    /// The camera had no frame; propulsion was stopped for this cycle.
    FrameUnavailable,

    /// The oracle could not be trusted or reached; `Forward` was used.
    OracleFallback(ReplyOrigin),

    /// A drive command was applied.
    CommandApplied {
        command: Command,
        state: ActuationState,
    },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// A fatal condition stopped the loop; actuators hold the fault posture.
    Halted(InitError),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryData {
    pub cycles: u64,
    pub brakes: u64,
    pub frame_failures: u64,
    pub oracle_answers: u64,
    pub fallback_unassociated: u64,
    pub fallback_transport: u64,
    pub fallback_unrecognized: u64,
    pub last_distance: Option<DistanceSample>,
    /// Advisory grade of `last_distance`; never drives the brake.
    pub proximity: Option<ProximityGrade>,
    pub actuation: ActuationState,
}

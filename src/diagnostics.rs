//! Runtime diagnostics.
//!
//! In-memory counters over cycle outcomes, reset at boot.  Nothing here
//! influences control decisions; the counters only feed the periodic
//! telemetry snapshot.

use crate::actuation::ActuationState;
use crate::app::control_loop::CycleOutcome;
use crate::app::events::TelemetryData;
use crate::oracle::ReplyOrigin;
use crate::sensors::DistanceSample;
use crate::sensors::grade::ProximityGrade;

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    cycles: u64,
    brakes: u64,
    frame_failures: u64,
    oracle_answers: u64,
    fallback_unassociated: u64,
    fallback_transport: u64,
    fallback_unrecognized: u64,
    last_distance: Option<DistanceSample>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_distance(&mut self, sample: DistanceSample) {
        self.last_distance = Some(sample);
    }

    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Braked { .. } => self.brakes += 1,
            CycleOutcome::FrameUnavailable => self.frame_failures += 1,
            CycleOutcome::Drove { origin, .. } => match origin {
                ReplyOrigin::Oracle => self.oracle_answers += 1,
                ReplyOrigin::NotAssociated => self.fallback_unassociated += 1,
                ReplyOrigin::Transport(_) => self.fallback_transport += 1,
                ReplyOrigin::Unrecognized(_) => self.fallback_unrecognized += 1,
            },
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Total cycles that drove on the fallback command.
    pub fn fallbacks(&self) -> u64 {
        self.fallback_unassociated + self.fallback_transport + self.fallback_unrecognized
    }

    pub fn snapshot(&self, actuation: ActuationState) -> TelemetryData {
        TelemetryData {
            cycles: self.cycles,
            brakes: self.brakes,
            frame_failures: self.frame_failures,
            oracle_answers: self.oracle_answers,
            fallback_unassociated: self.fallback_unassociated,
            fallback_transport: self.fallback_transport,
            fallback_unrecognized: self.fallback_unrecognized,
            last_distance: self.last_distance,
            proximity: self.last_distance.and_then(ProximityGrade::of),
            actuation,
        }
    }
}

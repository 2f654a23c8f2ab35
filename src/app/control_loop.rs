//! Control loop, the hexagonal core.
//!
//! [`ControlLoop`] owns the configuration, the brake policy and the
//! actuation state.  All I/O flows through port traits passed in at the
//! call site, so the whole cycle runs against mock adapters on the host.
//!
//! ```text
//!                 ┌───────────┐  Brake   ┌───────────────────────────┐
//!  ProximityPort ─▶   Sense   ├─────────▶ indicator, REVERSE, STOPPED │
//!                 └─────┬─────┘          └───────────────────────────┘
//!                       │ Drive
//!                       ▼
//!   FrameSource ─▶ FrameLease ─▶ OraclePort ─▶ Command ─▶ ActuatorPort
//! ```
//!
//! Each cycle is evaluated in strict order: Sense, then either Brake or
//! Drive, then the settle pause.  The Brake branch never touches the
//! camera or the network.  Nothing carries over between cycles except the
//! physical actuator state.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::actuation::{ActuationState, PropulsionState, SteerState};
use crate::config::SystemConfig;
use crate::diagnostics::Diagnostics;
use crate::error::InitError;
use crate::oracle::ReplyOrigin;
use crate::safety::{BrakePolicy, Branch};

use super::commands::Command;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, FrameLease, FrameSource, OraclePort, ProximityPort};

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Obstacle inside the brake distance; brake manoeuvre ran.
    Braked { distance_cm: i32 },
    /// No frame available; propulsion stopped for this cycle.
    FrameUnavailable,
    /// A command was applied (possibly the fallback).
    Drove { command: Command, origin: ReplyOrigin },
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    config: SystemConfig,
    policy: BrakePolicy,
    actuation: ActuationState,
    diagnostics: Diagnostics,
}

impl ControlLoop {
    /// Construct the loop.  Does **not** touch actuators; call [`start`]
    /// next.
    ///
    /// [`start`]: ControlLoop::start
    pub fn new(config: SystemConfig) -> Self {
        let policy = BrakePolicy::new(&config);
        Self {
            config,
            policy,
            actuation: ActuationState::NEUTRAL,
            diagnostics: Diagnostics::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output to the neutral posture.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.apply(hw, ActuationState::NEUTRAL);
        sink.emit(&AppEvent::Started(self.actuation));
        info!(
            "ControlLoop started (brake at {} cm)",
            self.policy.brake_distance_cm()
        );
    }

    /// Hold the fault posture after a fatal error.  The caller stops
    /// cycling afterwards.
    pub fn halt(
        &mut self,
        cause: InitError,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.apply(hw, ActuationState::FAULT);
        sink.emit(&AppEvent::Halted(cause));
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle: sense → brake | drive → settle.
    ///
    /// `hw` satisfies **both** [`ProximityPort`] and [`ActuatorPort`]:
    /// one board adapter owns every line.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl ProximityPort + ActuatorPort),
        frames: &mut impl FrameSource,
        oracle: &mut impl OraclePort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        // 1. Sense
        let sample = hw.measure_distance();
        self.diagnostics.record_distance(sample);
        sink.emit(&AppEvent::Distance(sample));

        // 2. Brake | Drive
        let outcome = match self.policy.evaluate(sample) {
            Branch::Brake(distance_cm) => self.brake(distance_cm, hw, delay, sink),
            Branch::Drive => self.drive(hw, frames, oracle, delay, sink),
        };

        // 3. Bookkeeping
        self.diagnostics.record(&outcome);
        let every = u64::from(self.config.telemetry_interval_cycles);
        if every > 0 && self.diagnostics.cycles() % every == 0 {
            sink.emit(&AppEvent::Telemetry(self.diagnostics.snapshot(self.actuation)));
        }

        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    /// Last commanded actuation posture.
    pub fn actuation(&self) -> ActuationState {
        self.actuation
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Total cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.diagnostics.cycles()
    }

    // ── Branches ──────────────────────────────────────────────

    /// Indicator on, reverse briefly, stop, settle.  No camera, no network.
    fn brake(
        &mut self,
        distance_cm: i32,
        hw: &mut impl ActuatorPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        // Indicator first so reverse is never commanded without it.
        self.set_brake_indicator(hw, true);
        self.set_propulsion(hw, PropulsionState::Reverse);
        delay.delay_ms(self.config.reverse_ms);
        self.set_propulsion(hw, PropulsionState::Stopped);
        sink.emit(&AppEvent::BrakeEngaged { distance_cm });
        delay.delay_ms(self.config.brake_settle_ms);
        CycleOutcome::Braked { distance_cm }
    }

    fn drive(
        &mut self,
        hw: &mut impl ActuatorPort,
        frames: &mut impl FrameSource,
        oracle: &mut impl OraclePort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        let reply = {
            let lease = match FrameLease::acquire(frames) {
                Ok(lease) => lease,
                Err(e) => {
                    warn!("Camera capture failed: {}", e);
                    self.set_propulsion(hw, PropulsionState::Stopped);
                    sink.emit(&AppEvent::FrameUnavailable);
                    delay.delay_ms(self.config.frame_retry_pause_ms);
                    return CycleOutcome::FrameUnavailable;
                }
            };
            oracle.request_command(lease.bytes())
            // lease dropped here: frame back to the camera before actuation
        };

        if reply.origin.is_fallback() {
            sink.emit(&AppEvent::OracleFallback(reply.origin.clone()));
        }

        let target = ActuationState::for_command(reply.command);
        self.apply(hw, target);
        sink.emit(&AppEvent::CommandApplied {
            command: reply.command,
            state: target,
        });

        delay.delay_ms(self.config.cycle_settle_ms);
        CycleOutcome::Drove {
            command: reply.command,
            origin: reply.origin,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Issue a full posture: indicator, steering, then propulsion.
    fn apply(&mut self, hw: &mut impl ActuatorPort, target: ActuationState) {
        self.set_brake_indicator(hw, target.brake_indicator);
        self.set_steering(hw, target.steering);
        self.set_propulsion(hw, target.propulsion);
    }

    fn set_propulsion(&mut self, hw: &mut impl ActuatorPort, state: PropulsionState) {
        hw.set_propulsion(state);
        self.actuation.propulsion = state;
        debug_assert!(self.actuation.is_consistent(), "reverse without brake indicator");
    }

    fn set_steering(&mut self, hw: &mut impl ActuatorPort, state: SteerState) {
        hw.set_steering(state);
        self.actuation.steering = state;
    }

    fn set_brake_indicator(&mut self, hw: &mut impl ActuatorPort, on: bool) {
        hw.set_brake_indicator(on);
        self.actuation.brake_indicator = on;
        debug_assert!(self.actuation.is_consistent(), "indicator cleared while reversing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;
    use crate::oracle::OracleReply;
    use crate::sensors::DistanceSample;

    struct Board {
        distance: DistanceSample,
        calls: Vec<String>,
    }

    impl ProximityPort for Board {
        fn measure_distance(&mut self) -> DistanceSample {
            self.distance
        }
    }

    impl ActuatorPort for Board {
        fn set_propulsion(&mut self, state: PropulsionState) {
            self.calls.push(format!("prop:{state:?}"));
        }
        fn set_steering(&mut self, state: SteerState) {
            self.calls.push(format!("steer:{state:?}"));
        }
        fn set_brake_indicator(&mut self, on: bool) {
            self.calls.push(format!("led:{on}"));
        }
    }

    struct OneFrame;

    impl FrameSource for OneFrame {
        type Frame = [u8; 2];
        fn acquire(&mut self) -> Result<[u8; 2], FrameError> {
            Ok([0xFF, 0xD8])
        }
        fn release(&mut self, _frame: [u8; 2]) {}
    }

    struct Fixed(Command);

    impl OraclePort for Fixed {
        fn request_command(&mut self, _frame: &[u8]) -> OracleReply {
            OracleReply::answered(self.0)
        }
    }

    #[derive(Default)]
    struct NoDelay(u64);

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0 += u64::from(ns);
        }
    }

    struct Quiet;

    impl EventSink for Quiet {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    fn board(cm: i32) -> Board {
        Board {
            distance: DistanceSample::from_raw(cm),
            calls: Vec::new(),
        }
    }

    #[test]
    fn brake_sequence_order() {
        let mut cl = ControlLoop::new(SystemConfig::default());
        let mut hw = board(15);
        let mut delay = NoDelay::default();
        let out = cl.run_cycle(&mut hw, &mut OneFrame, &mut Fixed(Command::Left), &mut delay, &mut Quiet);
        assert_eq!(out, CycleOutcome::Braked { distance_cm: 15 });
        assert_eq!(hw.calls, ["led:true", "prop:Reverse", "prop:Stopped"]);
        // reverse 400 ms + settle 500 ms
        assert_eq!(delay.0, 900_000_000);
        assert_eq!(cl.actuation().propulsion, PropulsionState::Stopped);
        assert!(cl.actuation().brake_indicator);
    }

    #[test]
    fn drive_clears_indicator_before_moving() {
        let mut cl = ControlLoop::new(SystemConfig::default());
        let mut hw = board(150);
        let mut delay = NoDelay::default();
        cl.run_cycle(&mut hw, &mut OneFrame, &mut Fixed(Command::Right), &mut delay, &mut Quiet);
        assert_eq!(hw.calls, ["led:false", "steer:Right", "prop:Forward"]);
        assert_eq!(delay.0, 200_000_000);
    }

    #[test]
    fn start_applies_neutral() {
        let mut cl = ControlLoop::new(SystemConfig::default());
        let mut hw = board(150);
        cl.start(&mut hw, &mut Quiet);
        assert_eq!(hw.calls, ["led:false", "steer:Straight", "prop:Stopped"]);
        assert_eq!(cl.actuation(), ActuationState::NEUTRAL);
    }

    #[test]
    fn halt_holds_fault_posture() {
        let mut cl = ControlLoop::new(SystemConfig::default());
        let mut hw = board(150);
        cl.halt(InitError::Camera(0x105), &mut hw, &mut Quiet);
        assert_eq!(cl.actuation(), ActuationState::FAULT);
    }
}

//! Integration tests for the ControlLoop → OracleClient → actuators
//! pipeline.
//!
//! Each test wires the real `ControlLoop` and `OracleClient` to the mock
//! adapters in `mock_hw` and drives whole cycles.

use edgepilot::actuation::{ActuationState, PropulsionState, SteerState};
use edgepilot::app::commands::Command;
use edgepilot::app::control_loop::{ControlLoop, CycleOutcome};
use edgepilot::app::events::AppEvent;
use edgepilot::app::ports::HttpResponse;
use edgepilot::config::SystemConfig;
use edgepilot::error::CommsError;
use edgepilot::oracle::{OracleClient, ReplyOrigin};
use edgepilot::sensors::grade::ProximityGrade;

use crate::mock_hw::{
    ActuatorCall, MockDelay, MockFrames, MockHardware, MockHttp, MockLink, MockOracle, RecordingSink,
};

struct Rig {
    control: ControlLoop,
    hw: MockHardware,
    frames: MockFrames,
    oracle: MockOracle,
    delay: MockDelay,
    sink: RecordingSink,
}

impl Rig {
    fn new(distances: &[i32], http: MockHttp, associated: bool) -> Self {
        let mut rig = Self {
            control: ControlLoop::new(SystemConfig::default()),
            hw: MockHardware::new(distances),
            frames: MockFrames::default(),
            oracle: OracleClient::new(http, MockLink(associated)),
            delay: MockDelay::default(),
            sink: RecordingSink::default(),
        };
        rig.control.start(&mut rig.hw, &mut rig.sink);
        rig.hw.calls.clear();
        rig.sink.events.clear();
        rig
    }

    fn cycle(&mut self) -> CycleOutcome {
        self.control.run_cycle(
            &mut self.hw,
            &mut self.frames,
            &mut self.oracle,
            &mut self.delay,
            &mut self.sink,
        )
    }

    fn http_calls(&self) -> usize {
        self.oracle.http().requests.len()
    }
}

// ── Scenario 1: obstacle inside the brake distance ────────────

#[test]
fn obstacle_at_15cm_brakes_without_network() {
    let mut rig = Rig::new(&[15], MockHttp::answering("LEFT"), true);

    let out = rig.cycle();

    assert_eq!(out, CycleOutcome::Braked { distance_cm: 15 });
    assert_eq!(
        rig.hw.calls,
        [
            ActuatorCall::BrakeIndicator(true),
            ActuatorCall::Propulsion(PropulsionState::Reverse),
            ActuatorCall::Propulsion(PropulsionState::Stopped),
        ]
    );
    assert_eq!(rig.http_calls(), 0, "brake branch must not call the oracle");
    assert_eq!(rig.frames.acquired, 0, "brake branch must not capture");
    assert_eq!(rig.delay.total_ms(), 400 + 500);
}

// ── Scenario 2: clear road, oracle says LEFT ──────────────────

#[test]
fn clear_road_follows_oracle_left() {
    let mut rig = Rig::new(&[150], MockHttp::answering("LEFT"), true);

    let out = rig.cycle();

    assert_eq!(
        out,
        CycleOutcome::Drove {
            command: Command::Left,
            origin: ReplyOrigin::Oracle
        }
    );
    assert_eq!(rig.hw.steering(), SteerState::Left);
    assert_eq!(rig.hw.propulsion(), PropulsionState::Forward);
    assert!(!rig.hw.brake_indicator());
    assert_eq!(rig.oracle.http().requests, [("image/jpeg".to_owned(), 4)]);
    assert_eq!(rig.delay.total_ms(), 200);
}

// ── Scenario 3: no echo counts as clear ───────────────────────

#[test]
fn no_echo_enters_drive() {
    let mut rig = Rig::new(&[-1], MockHttp::answering("RIGHT"), true);

    let out = rig.cycle();

    assert!(matches!(out, CycleOutcome::Drove { command: Command::Right, .. }));
    assert_eq!(rig.frames.acquired, 1);
    assert!(!rig.hw.propulsion_history().contains(&PropulsionState::Reverse));
}

// ── Scenario 4: link down ─────────────────────────────────────

#[test]
fn unassociated_defaults_forward_without_transport() {
    let mut rig = Rig::new(&[150], MockHttp::answering("LEFT"), false);

    let out = rig.cycle();

    assert_eq!(
        out,
        CycleOutcome::Drove {
            command: Command::Forward,
            origin: ReplyOrigin::NotAssociated
        }
    );
    assert_eq!(rig.http_calls(), 0);
    assert_eq!(rig.hw.steering(), SteerState::Straight);
    assert_eq!(rig.hw.propulsion(), PropulsionState::Forward);
    assert_eq!(rig.frames.released, 1, "frame still returned");
    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::OracleFallback(ReplyOrigin::NotAssociated)))
    );
}

// ── Scenario 5: wrong case ────────────────────────────────────

#[test]
fn lowercase_reply_maps_to_forward() {
    let mut rig = Rig::new(&[150], MockHttp::answering(" right \n"), true);

    let out = rig.cycle();

    match out {
        CycleOutcome::Drove { command, origin } => {
            assert_eq!(command, Command::Forward);
            assert!(matches!(origin, ReplyOrigin::Unrecognized(_)));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(rig.hw.steering(), SteerState::Straight);
    assert_eq!(rig.hw.propulsion(), PropulsionState::Forward);
}

// ── Scenario 6: camera has no buffer ──────────────────────────

#[test]
fn missing_frame_stops_without_oracle_call() {
    let mut rig = Rig::new(&[150], MockHttp::answering("LEFT"), true);
    rig.frames = MockFrames::failing();

    let out = rig.cycle();

    assert_eq!(out, CycleOutcome::FrameUnavailable);
    assert_eq!(rig.hw.calls, [ActuatorCall::Propulsion(PropulsionState::Stopped)]);
    assert_eq!(rig.http_calls(), 0);
    assert_eq!(rig.frames.released, 0);
    assert_eq!(rig.delay.total_ms(), 200);
}

// ── Resource release ──────────────────────────────────────────

#[test]
fn every_acquired_frame_is_released_once() {
    let http = MockHttp::scripted(vec![
        Ok(HttpResponse::new(200, b"LEFT")),
        Err(CommsError::Timeout),
        Ok(HttpResponse::new(503, b"RIGHT")),
        Err(CommsError::Connect),
        Ok(HttpResponse::new(200, b"garbage")),
        Ok(HttpResponse::new(200, b"RIGHT\r\n")),
    ]);
    let mut rig = Rig::new(&[150, 80, 300, -1, 45, 60], http, true);

    for _ in 0..6 {
        rig.cycle();
        assert_eq!(rig.frames.outstanding(), 0);
    }

    assert_eq!(rig.frames.acquired, 6);
    assert_eq!(rig.frames.released, 6);
    assert_eq!(rig.http_calls(), 6, "one request per drive cycle, no retry");
    assert_eq!(rig.hw.steering(), SteerState::Right);
}

#[test]
fn transport_failures_fall_back_forward() {
    for e in [CommsError::Timeout, CommsError::Connect, CommsError::Io] {
        let mut rig = Rig::new(&[150], MockHttp::failing(e), true);
        let out = rig.cycle();
        assert_eq!(
            out,
            CycleOutcome::Drove {
                command: Command::Forward,
                origin: ReplyOrigin::Transport(e)
            }
        );
    }
}

// ── Multi-cycle behaviour ─────────────────────────────────────

#[test]
fn braking_clears_on_the_next_clear_reading() {
    let mut rig = Rig::new(&[10, 200], MockHttp::answering("RIGHT"), true);

    rig.cycle();
    assert!(rig.hw.brake_indicator());
    assert_eq!(rig.hw.propulsion(), PropulsionState::Stopped);

    rig.cycle();
    assert!(!rig.hw.brake_indicator(), "indicator cleared before driving");
    assert_eq!(rig.hw.steering(), SteerState::Right);
    assert_eq!(rig.hw.propulsion(), PropulsionState::Forward);
    assert_eq!(rig.http_calls(), 1);
}

#[test]
fn threshold_boundary() {
    let mut rig = Rig::new(&[20, 21, 0], MockHttp::answering("FORWARD"), true);
    assert_eq!(rig.cycle(), CycleOutcome::Braked { distance_cm: 20 });
    assert!(matches!(rig.cycle(), CycleOutcome::Drove { .. }));
    assert!(matches!(rig.cycle(), CycleOutcome::Drove { .. }), "zero is not a valid echo");
}

#[test]
fn reverse_only_while_indicator_lit() {
    let mut rig = Rig::new(&[5, 150, 12, -1, 19], MockHttp::answering("LEFT"), true);
    for _ in 0..5 {
        rig.cycle();
    }

    let mut indicator = false;
    for call in &rig.hw.calls {
        match call {
            ActuatorCall::BrakeIndicator(on) => indicator = *on,
            ActuatorCall::Propulsion(PropulsionState::Reverse) => {
                assert!(indicator, "reverse commanded with indicator off");
            }
            _ => {}
        }
    }
    assert!(rig.control.actuation().is_consistent());
}

#[test]
fn repeating_a_command_is_harmless() {
    let mut rig = Rig::new(&[150], MockHttp::answering("LEFT"), true);
    rig.cycle();
    let after_first = rig.control.actuation();
    rig.cycle();
    assert_eq!(rig.control.actuation(), after_first);
    assert_eq!(after_first, ActuationState::for_command(Command::Left));
}

// ── Events and telemetry ──────────────────────────────────────

#[test]
fn telemetry_every_interval() {
    let config = SystemConfig {
        telemetry_interval_cycles: 3,
        ..SystemConfig::default()
    };
    let mut control = ControlLoop::new(config);
    let mut hw = MockHardware::new(&[150, 10, 150, 150, 150, 150]);
    let mut frames = MockFrames::default();
    let mut oracle = OracleClient::new(MockHttp::answering("LEFT"), MockLink(true));
    let mut delay = MockDelay::default();
    let mut sink = RecordingSink::default();

    for _ in 0..6 {
        control.run_cycle(&mut hw, &mut frames, &mut oracle, &mut delay, &mut sink);
    }

    let telemetry: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 2);
    assert_eq!(telemetry[0].cycles, 3);
    assert_eq!(telemetry[0].brakes, 1);
    assert_eq!(telemetry[1].oracle_answers, 5);
    assert_eq!(control.cycle_count(), 6);
}

#[test]
fn stop_grade_outside_brake_distance_still_drives() {
    let config = SystemConfig {
        telemetry_interval_cycles: 1,
        ..SystemConfig::default()
    };
    let mut control = ControlLoop::new(config);
    let mut hw = MockHardware::new(&[35]);
    let mut frames = MockFrames::default();
    let mut oracle = OracleClient::new(MockHttp::answering("RIGHT"), MockLink(true));
    let mut delay = MockDelay::default();
    let mut sink = RecordingSink::default();

    let outcome = control.run_cycle(&mut hw, &mut frames, &mut oracle, &mut delay, &mut sink);

    assert!(matches!(outcome, CycleOutcome::Drove { command: Command::Right, .. }));
    let grade = sink.events.iter().find_map(|e| match e {
        AppEvent::Telemetry(t) => t.proximity,
        _ => None,
    });
    assert_eq!(grade, Some(ProximityGrade::Stop));
}

#[test]
fn each_cycle_reports_its_distance_first() {
    let mut rig = Rig::new(&[42], MockHttp::answering("LEFT"), true);
    rig.cycle();
    assert!(matches!(
        rig.sink.events.first(),
        Some(AppEvent::Distance(d)) if d.centimetres() == Some(42)
    ));
}

#[test]
fn halt_leaves_fault_posture() {
    let mut rig = Rig::new(&[150], MockHttp::answering("LEFT"), true);
    rig.cycle();
    rig.control.halt(
        edgepilot::error::InitError::Camera(-1),
        &mut rig.hw,
        &mut rig.sink,
    );
    assert_eq!(rig.hw.propulsion(), PropulsionState::Stopped);
    assert_eq!(rig.hw.steering(), SteerState::Straight);
    assert!(rig.hw.brake_indicator());
}

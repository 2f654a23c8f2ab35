//! Actuation state: propulsion axis, steering axis, brake indicator.
//!
//! The two axes are independent.  The only cross-axis rule is that the
//! motor may run in reverse only while the brake indicator is lit, i.e.
//! reverse exists solely as part of the braking manoeuvre.

use crate::app::commands::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropulsionState {
    #[default]
    Stopped,
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteerState {
    #[default]
    Straight,
    Left,
    Right,
}

/// Conjunction of both axes plus the brake indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuationState {
    pub propulsion: PropulsionState,
    pub steering: SteerState,
    pub brake_indicator: bool,
}

impl ActuationState {
    /// Power-on posture: stopped, straight, indicator off.
    pub const NEUTRAL: Self = Self {
        propulsion: PropulsionState::Stopped,
        steering: SteerState::Straight,
        brake_indicator: false,
    };

    /// Posture held while the system is halted on a fatal fault.
    pub const FAULT: Self = Self {
        propulsion: PropulsionState::Stopped,
        steering: SteerState::Straight,
        brake_indicator: true,
    };

    /// Drive posture for an oracle command.  Always propels forward with
    /// the indicator cleared.
    pub fn for_command(command: Command) -> Self {
        let steering = match command {
            Command::Left => SteerState::Left,
            Command::Right => SteerState::Right,
            Command::Forward => SteerState::Straight,
        };
        Self {
            propulsion: PropulsionState::Forward,
            steering,
            brake_indicator: false,
        }
    }

    /// Reverse is only legal as part of a brake manoeuvre.
    pub fn is_consistent(&self) -> bool {
        self.propulsion != PropulsionState::Reverse || self.brake_indicator
    }
}

//! Propulsion motor driver (two-line H-bridge).
//!
//! | State     | A1   | A2   |
//! |-----------|------|------|
//! | `Forward` | HIGH | LOW  |
//! | `Reverse` | LOW  | HIGH |
//! | `Stopped` | LOW  | LOW  |
//!
//! The driver never drives both lines HIGH: on a direction change the
//! line going LOW is written first.  It is a dumb actuator; the rule that
//! reverse only happens while braking lives in the control loop.

use embedded_hal::digital::OutputPin;

use crate::actuation::PropulsionState;

pub struct MotorDriver<P> {
    a1: P,
    a2: P,
    state: PropulsionState,
}

impl<P: OutputPin> MotorDriver<P> {
    /// Take both lines and force them LOW.
    pub fn new(mut a1: P, mut a2: P) -> Result<Self, P::Error> {
        a1.set_low()?;
        a2.set_low()?;
        Ok(Self {
            a1,
            a2,
            state: PropulsionState::Stopped,
        })
    }

    /// Apply `state`.  Returns `Ok(false)` without touching the lines when
    /// the motor is already in that state.
    pub fn set(&mut self, state: PropulsionState) -> Result<bool, P::Error> {
        if state == self.state {
            return Ok(false);
        }
        match state {
            PropulsionState::Forward => {
                self.a2.set_low()?;
                self.a1.set_high()?;
            }
            PropulsionState::Reverse => {
                self.a1.set_low()?;
                self.a2.set_high()?;
            }
            PropulsionState::Stopped => {
                self.a1.set_low()?;
                self.a2.set_low()?;
            }
        }
        self.state = state;
        Ok(true)
    }

    pub fn state(&self) -> PropulsionState {
        self.state
    }
}

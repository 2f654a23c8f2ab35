//! Steering driver: two lines, one per direction.
//!
//! LEFT = (L HIGH, R LOW), RIGHT = (L LOW, R HIGH), STRAIGHT = both LOW.
//! Both lines are never HIGH together.

use embedded_hal::digital::OutputPin;

use crate::actuation::SteerState;

pub struct SteeringDriver<P> {
    left: P,
    right: P,
    state: SteerState,
}

impl<P: OutputPin> SteeringDriver<P> {
    pub fn new(mut left: P, mut right: P) -> Result<Self, P::Error> {
        left.set_low()?;
        right.set_low()?;
        Ok(Self {
            left,
            right,
            state: SteerState::Straight,
        })
    }

    /// Apply `state`; `Ok(false)` if nothing changed.
    pub fn set(&mut self, state: SteerState) -> Result<bool, P::Error> {
        if state == self.state {
            return Ok(false);
        }
        match state {
            SteerState::Left => {
                self.right.set_low()?;
                self.left.set_high()?;
            }
            SteerState::Right => {
                self.left.set_low()?;
                self.right.set_high()?;
            }
            SteerState::Straight => {
                self.left.set_low()?;
                self.right.set_low()?;
            }
        }
        self.state = state;
        Ok(true)
    }

    pub fn state(&self) -> SteerState {
        self.state
    }
}

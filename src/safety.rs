//! Brake policy: the Sense decision.
//!
//! Runs **first in every cycle**, before any frame is captured or any
//! network call is made.  A valid echo at or inside the brake distance
//! sends the cycle down the Brake branch; everything else, including
//! "no echo", goes down Drive.
//!
//! The policy keeps no history.  Once an obstacle clears, the very next
//! cycle drives again.

use log::info;

use crate::config::SystemConfig;
use crate::sensors::DistanceSample;

/// Which branch the current cycle takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Obstacle inside the brake distance (carries the distance in cm).
    Brake(i32),
    /// Clear, or unknown.
    Drive,
}

/// Stateless brake-distance check.
#[derive(Debug, Clone, Copy)]
pub struct BrakePolicy {
    brake_distance_cm: i32,
}

impl BrakePolicy {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            brake_distance_cm: config.brake_distance_cm,
        }
    }

    pub fn brake_distance_cm(&self) -> i32 {
        self.brake_distance_cm
    }

    /// Decide the branch for one sample.
    ///
    /// Only a positive distance can brake: the no-echo sentinel and a
    /// zero-width echo are treated as clear.
    pub fn evaluate(&self, sample: DistanceSample) -> Branch {
        match sample.centimetres() {
            Some(cm) if cm <= self.brake_distance_cm => {
                info!("Obstacle at {} cm (limit {} cm) -> braking", cm, self.brake_distance_cm);
                Branch::Brake(cm)
            }
            _ => Branch::Drive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BrakePolicy {
        BrakePolicy::new(&SystemConfig::default())
    }

    #[test]
    fn brakes_inside_threshold() {
        assert_eq!(policy().evaluate(DistanceSample::Cm(15)), Branch::Brake(15));
        assert_eq!(policy().evaluate(DistanceSample::Cm(1)), Branch::Brake(1));
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(policy().evaluate(DistanceSample::Cm(20)), Branch::Brake(20));
        assert_eq!(policy().evaluate(DistanceSample::Cm(21)), Branch::Drive);
    }

    #[test]
    fn no_echo_never_brakes() {
        assert_eq!(policy().evaluate(DistanceSample::NoEcho), Branch::Drive);
        assert_eq!(policy().evaluate(DistanceSample::from_raw(-1)), Branch::Drive);
    }

    #[test]
    fn zero_and_negative_do_not_brake() {
        assert_eq!(policy().evaluate(DistanceSample::Cm(0)), Branch::Drive);
        assert_eq!(policy().evaluate(DistanceSample::Cm(-5)), Branch::Drive);
    }

    #[test]
    fn uses_configured_distance() {
        let cfg = SystemConfig {
            brake_distance_cm: 50,
            ..Default::default()
        };
        let p = BrakePolicy::new(&cfg);
        assert_eq!(p.evaluate(DistanceSample::Cm(45)), Branch::Brake(45));
    }
}

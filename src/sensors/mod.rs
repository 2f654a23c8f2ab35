//! Sensor subsystem: the proximity sample type, the ultrasonic driver and
//! the advisory proximity grade.

pub mod grade;
pub mod ultrasonic;

use core::fmt;

/// Raw value the sensor reports when no echo came back.
pub const NO_ECHO: i32 = -1;

/// One proximity measurement, consumed in the cycle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceSample {
    /// Measured distance in whole centimetres (truncated).
    Cm(i32),
    /// No echo inside the timeout window.  Treated as "clear".
    NoEcho,
}

impl DistanceSample {
    /// Build from the raw sensor convention (`-1` = no echo).
    pub fn from_raw(raw: i32) -> Self {
        if raw == NO_ECHO {
            Self::NoEcho
        } else {
            Self::Cm(raw)
        }
    }

    /// Back to the raw convention.
    pub fn raw(self) -> i32 {
        match self {
            Self::Cm(cm) => cm,
            Self::NoEcho => NO_ECHO,
        }
    }

    /// Distance when a real, positive echo was measured.
    pub fn centimetres(self) -> Option<i32> {
        match self {
            Self::Cm(cm) if cm > 0 => Some(cm),
            _ => None,
        }
    }
}

impl fmt::Display for DistanceSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cm(cm) => write!(f, "{cm} cm"),
            Self::NoEcho => write!(f, "no echo"),
        }
    }
}

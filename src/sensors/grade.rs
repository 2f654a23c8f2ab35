//! Advisory fuzzy proximity grade.
//!
//! Grades a distance as STOP / SLOW DOWN / GO from four S-curve
//! memberships (very close, close, far, very far; centres 20/40/80/100 cm,
//! width 40 cm).  The stop strength is the stronger of the two near
//! memberships, the go strength the stronger of the two far ones, and the
//! score is `stop / (stop + go)`.
//!
//! Reported in telemetry only.  The brake decision stays the crisp
//! threshold in [`BrakePolicy`](crate::safety::BrakePolicy).

use core::fmt;

use super::DistanceSample;

/// S-curve width (cm); steepness is `6 / width`.
const WIDTH_CM: f32 = 40.0;
const VERY_CLOSE_CM: f32 = 20.0;
const CLOSE_CM: f32 = 40.0;
const FAR_CM: f32 = 80.0;
const VERY_FAR_CM: f32 = 100.0;

/// Score at or above which the grade is [`ProximityGrade::Stop`].
pub const STOP_SCORE: f32 = 0.7;
/// Score at or above which the grade is [`ProximityGrade::SlowDown`].
pub const SLOW_SCORE: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityGrade {
    Stop,
    SlowDown,
    Go,
}

impl ProximityGrade {
    pub fn from_score(score: f32) -> Self {
        if score >= STOP_SCORE {
            Self::Stop
        } else if score >= SLOW_SCORE {
            Self::SlowDown
        } else {
            Self::Go
        }
    }

    /// Grade a sample; `None` when there is no usable distance.
    pub fn of(sample: DistanceSample) -> Option<Self> {
        sample
            .centimetres()
            .map(|cm| Self::from_score(stop_score(cm as f32)))
    }
}

impl fmt::Display for ProximityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stop => "STOP",
            Self::SlowDown => "SLOW DOWN",
            Self::Go => "GO",
        })
    }
}

/// Rising S-curve centred on `center_cm`.
fn rising(distance_cm: f32, center_cm: f32) -> f32 {
    let steepness = 6.0 / WIDTH_CM;
    1.0 / (1.0 + (-steepness * (distance_cm - center_cm)).exp())
}

/// Memberships in order: very close, close, far, very far.
pub fn memberships(distance_cm: f32) -> [f32; 4] {
    [
        1.0 - rising(distance_cm, VERY_CLOSE_CM),
        1.0 - rising(distance_cm, CLOSE_CM),
        rising(distance_cm, FAR_CM),
        rising(distance_cm, VERY_FAR_CM),
    ]
}

/// Defuzzified stop strength in `0.0..=1.0` (1 = stop).
pub fn stop_score(distance_cm: f32) -> f32 {
    let [very_close, close, far, very_far] = memberships(distance_cm);
    let stop = very_close.max(close);
    let go = far.max(very_far);
    let total = stop + go;
    if total == 0.0 {
        return 0.5;
    }
    stop / total
}

//! Filter memory.

use std::time::Instant;

use contracts::{AttitudeEstimate, OutputSchema, ATTITUDE_FIELD_COUNT};
use nalgebra::UnitQuaternion;

/// Mutable filter state, owned by a single fusion loop
///
/// Angles are radians and are never wrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionState {
    pub pitch: f64,
    pub roll: f64,
    /// Wall-clock time of the previous integration step
    pub last_update: Instant,
}

impl FusionState {
    /// Level cold start: pitch and roll are zero
    pub fn new(now: Instant) -> Self {
        Self {
            pitch: 0.0,
            roll: 0.0,
            last_update: now,
        }
    }

    pub fn estimate(&self) -> AttitudeEstimate {
        AttitudeEstimate::from_radians(self.pitch, self.roll)
    }

    /// Payload fields for the configured schema
    pub fn output_fields(&self, schema: OutputSchema) -> [f64; ATTITUDE_FIELD_COUNT] {
        match schema {
            OutputSchema::Euler => self.estimate().euler_fields(),
            OutputSchema::Quaternion => {
                let q = attitude_quaternion(self.pitch, self.roll);
                [q.w, q.i, q.j, q.k]
            }
        }
    }
}

/// Orientation with zero yaw.
///
/// Pitch integrates the x-axis rate and roll the negated y-axis rate, so the
/// rotation is `pitch` about x followed by `-roll` about y.
pub fn attitude_quaternion(pitch: f64, roll: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(pitch, -roll, 0.0)
}

//! AttitudeEstimate - fusion output

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Number of numeric fields in an attitude payload
pub const ATTITUDE_FIELD_COUNT: usize = 4;

/// Fused tilt estimate, in degrees for transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttitudeEstimate {
    pub pitch_deg: f64,
    pub roll_deg: f64,
}

impl AttitudeEstimate {
    /// Build from angles in radians
    pub fn from_radians(pitch: f64, roll: f64) -> Self {
        Self {
            pitch_deg: pitch.to_degrees(),
            roll_deg: roll.to_degrees(),
        }
    }

    /// `[pitch_deg, roll_deg, 0, 0]`
    pub fn euler_fields(&self) -> [f64; ATTITUDE_FIELD_COUNT] {
        [self.pitch_deg, self.roll_deg, 0.0, 0.0]
    }

    /// Parse an `euler` schema payload
    pub fn from_euler_fields(fields: &[f64]) -> Result<Self, ContractError> {
        if fields.len() != ATTITUDE_FIELD_COUNT {
            return Err(ContractError::FieldCount {
                expected: ATTITUDE_FIELD_COUNT,
                actual: fields.len(),
            });
        }
        Ok(Self {
            pitch_deg: fields[0],
            roll_deg: fields[1],
        })
    }
}

/// Outbound payload layout, fixed per deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    /// `[pitch_deg, roll_deg, 0, 0]`
    #[default]
    Euler,
    /// `[w, x, y, z]`, yaw fixed at zero
    Quaternion,
}

//! ImuSample - Ingestion output
//!
//! One raw IMU reading as carried on the wire.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Number of numeric fields in an IMU payload
pub const IMU_FIELD_COUNT: usize = 12;

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Raw IMU sample
///
/// Field order on the wire:
/// `[timestamp, uptime, acc_x, acc_y, acc_z, gyr_x, gyr_y, gyr_z, mag_x, mag_y, mag_z, temp]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    /// Sensor-reported time (seconds)
    pub timestamp: f64,

    /// Device uptime (seconds), informational
    pub uptime: f64,

    /// Specific force (g)
    pub accel: Vector3,

    /// Angular rate in raw sensor units, scaled by the gyro sensitivity
    pub gyro: Vector3,

    /// Magnetic field (raw units), not used by the tilt filter
    pub mag: Vector3,

    /// Sensor temperature, informational
    pub temperature: f64,
}

impl ImuSample {
    /// Level, motionless sample (1 g along +z, no rotation)
    pub fn level(timestamp: f64) -> Self {
        Self {
            timestamp,
            uptime: timestamp,
            accel: Vector3::new(0.0, 0.0, 1.0),
            gyro: Vector3::default(),
            mag: Vector3::default(),
            temperature: 0.0,
        }
    }

    /// Build a sample from its wire fields
    ///
    /// # Errors
    /// - wrong field count
    /// - any field NaN or infinite
    pub fn from_fields(fields: &[f64]) -> Result<Self, ContractError> {
        if fields.len() != IMU_FIELD_COUNT {
            return Err(ContractError::FieldCount {
                expected: IMU_FIELD_COUNT,
                actual: fields.len(),
            });
        }

        if let Some((index, &value)) = fields.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ContractError::NonFiniteField { index, value });
        }

        Ok(Self {
            timestamp: fields[0],
            uptime: fields[1],
            accel: Vector3::new(fields[2], fields[3], fields[4]),
            gyro: Vector3::new(fields[5], fields[6], fields[7]),
            mag: Vector3::new(fields[8], fields[9], fields[10]),
            temperature: fields[11],
        })
    }

    /// Wire fields in canonical order
    pub fn to_fields(&self) -> [f64; IMU_FIELD_COUNT] {
        [
            self.timestamp,
            self.uptime,
            self.accel.x,
            self.accel.y,
            self.accel.z,
            self.gyro.x,
            self.gyro.y,
            self.gyro.z,
            self.mag.x,
            self.mag.y,
            self.mag.z,
            self.temperature,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fields_layout() {
        let fields: Vec<f64> = (0..12).map(f64::from).collect();
        let sample = ImuSample::from_fields(&fields).unwrap();

        assert_eq!(sample.timestamp, 0.0);
        assert_eq!(sample.uptime, 1.0);
        assert_eq!(sample.accel, Vector3::new(2.0, 3.0, 4.0));
        assert_eq!(sample.gyro, Vector3::new(5.0, 6.0, 7.0));
        assert_eq!(sample.mag, Vector3::new(8.0, 9.0, 10.0));
        assert_eq!(sample.temperature, 11.0);
        assert_eq!(sample.to_fields().to_vec(), fields);
    }

    #[test]
    fn test_from_fields_wrong_count() {
        let err = ImuSample::from_fields(&[0.0; 11]).unwrap_err();
        assert!(matches!(
            err,
            ContractError::FieldCount {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn test_from_fields_rejects_nan() {
        let mut fields = [0.0; 12];
        fields[6] = f64::NAN;
        let err = ImuSample::from_fields(&fields).unwrap_err();
        assert!(matches!(err, ContractError::NonFiniteField { index: 6, .. }));
    }

    #[test]
    fn test_vector_norm() {
        assert!((Vector3::new(3.0, 4.0, 0.0).norm() - 5.0).abs() < 1e-12);
        assert_eq!(ImuSample::level(0.0).accel.norm(), 1.0);
    }
}

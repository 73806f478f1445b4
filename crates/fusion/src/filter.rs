//! Two-axis complementary filter.
//!
//! Gyro integration is smooth but drifts; the gravity direction from the
//! accelerometer is noisy but drift-free. Each step integrates the gyro rate and,
//! when the specific force is close to 1 g, pulls the estimate toward the
//! accelerometer tilt:
//!
//! ```text
//! pitch = α · (pitch + ω_x·dt) + (1 − α) · atan2(a_y, √(a_x² + a_z²))
//! roll  = β · (roll  − ω_y·dt) + (1 − β) · atan2(−a_x, a_z)
//! ```

use contracts::{FusionConfig, ImuSample};
use nalgebra::Vector3;

/// Specific-force window in which the accelerometer is trusted as a gravity
/// reference. Both bounds are inclusive and there is no hysteresis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelGate {
    pub min_g: f64,
    pub max_g: f64,
}

impl AccelGate {
    pub fn new(min_g: f64, max_g: f64) -> Self {
        Self { min_g, max_g }
    }

    #[inline]
    pub fn admits(&self, magnitude_g: f64) -> bool {
        magnitude_g >= self.min_g && magnitude_g <= self.max_g
    }
}

impl Default for AccelGate {
    fn default() -> Self {
        Self::new(0.9, 1.1)
    }
}

/// Tilt implied by the gravity vector: `(pitch, roll)` in radians
#[inline]
pub fn accel_tilt(accel: &Vector3<f64>) -> (f64, f64) {
    let pitch = accel.y.atan2((accel.x * accel.x + accel.z * accel.z).sqrt());
    let roll = (-accel.x).atan2(accel.z);
    (pitch, roll)
}

/// Result of one filter update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterUpdate {
    /// Specific-force magnitude (g)
    pub accel_magnitude: f64,
    /// Whether the accelerometer correction was applied
    pub corrected: bool,
}

/// Complementary filter constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplementaryFilter {
    gyro_sensitivity: f64,
    pitch_gyro_weight: f64,
    roll_gyro_weight: f64,
    gate: AccelGate,
}

impl ComplementaryFilter {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            gyro_sensitivity: config.gyro_sensitivity,
            pitch_gyro_weight: config.pitch_gyro_weight,
            roll_gyro_weight: config.roll_gyro_weight,
            gate: AccelGate::new(config.gate_min_g, config.gate_max_g),
        }
    }

    pub fn gate(&self) -> AccelGate {
        self.gate
    }

    /// Angular rate (rad/s) from raw gyro units
    #[inline]
    pub fn gyro_rate(&self, sample: &ImuSample) -> Vector3<f64> {
        Vector3::new(sample.gyro.x, sample.gyro.y, sample.gyro.z) / self.gyro_sensitivity
    }

    /// Gyro integration only
    #[inline]
    pub fn integrate(&self, pitch: &mut f64, roll: &mut f64, rate: &Vector3<f64>, dt: f64) {
        *pitch += rate.x * dt;
        *roll -= rate.y * dt;
    }

    /// Integrate, then correct toward the accelerometer tilt if the gate admits it
    pub fn update(
        &self,
        pitch: &mut f64,
        roll: &mut f64,
        sample: &ImuSample,
        dt: f64,
    ) -> FilterUpdate {
        let rate = self.gyro_rate(sample);
        self.integrate(pitch, roll, &rate, dt);

        let accel = Vector3::new(sample.accel.x, sample.accel.y, sample.accel.z);
        let accel_magnitude = accel.norm();
        let corrected = self.gate.admits(accel_magnitude);

        if corrected {
            let (accel_pitch, accel_roll) = accel_tilt(&accel);
            *pitch = *pitch * self.pitch_gyro_weight + accel_pitch * (1.0 - self.pitch_gyro_weight);
            *roll = *roll * self.roll_gyro_weight + accel_roll * (1.0 - self.roll_gyro_weight);
        }

        FilterUpdate {
            accel_magnitude,
            corrected,
        }
    }
}

impl Default for ComplementaryFilter {
    fn default() -> Self {
        Self::new(&FusionConfig::default())
    }
}

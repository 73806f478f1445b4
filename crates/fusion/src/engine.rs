//! Fusion engine: filter constants plus single-owner state.

use std::time::Instant;

use contracts::{AttitudeEstimate, FusionConfig, ImuSample, OutputSchema, ATTITUDE_FIELD_COUNT};
use nalgebra::Vector3;
use tracing::trace;

use crate::filter::ComplementaryFilter;
use crate::state::FusionState;

/// Outcome of one fusion step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Fresh estimate after the step
    pub estimate: AttitudeEstimate,
    /// Integration interval (seconds)
    pub dt: f64,
    /// Whether the accelerometer correction was applied
    pub corrected: bool,
    /// Specific-force magnitude (g); `None` for gyro-only free-run steps
    pub accel_magnitude: Option<f64>,
}

/// Attitude fusion engine
///
/// Owns the [`FusionState`]; must be driven by exactly one loop.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    filter: ComplementaryFilter,
    state: FusionState,
    /// Angular rate of the last fused sample, for free-run steps
    last_rate: Option<Vector3<f64>>,
}

impl FusionEngine {
    /// Create an engine at the level cold-start attitude
    pub fn new(config: &FusionConfig, now: Instant) -> Self {
        Self::with_filter(ComplementaryFilter::new(config), now)
    }

    pub fn with_filter(filter: ComplementaryFilter, now: Instant) -> Self {
        Self {
            filter,
            state: FusionState::new(now),
            last_rate: None,
        }
    }

    pub fn state(&self) -> &FusionState {
        &self.state
    }

    pub fn filter(&self) -> &ComplementaryFilter {
        &self.filter
    }

    /// Current estimate (degrees)
    pub fn estimate(&self) -> AttitudeEstimate {
        self.state.estimate()
    }

    /// Payload fields for the configured schema
    pub fn output_fields(&self, schema: OutputSchema) -> [f64; ATTITUDE_FIELD_COUNT] {
        self.state.output_fields(schema)
    }

    /// Re-anchor the integration clock without touching the angles
    pub fn reset_clock(&mut self, now: Instant) {
        self.state.last_update = now;
    }

    /// Fuse one sample over an explicit interval. Does not touch the clock.
    pub fn step(&mut self, sample: &ImuSample, dt: f64) -> StepOutcome {
        let update = self
            .filter
            .update(&mut self.state.pitch, &mut self.state.roll, sample, dt);

        self.last_rate = Some(self.filter.gyro_rate(sample));

        StepOutcome {
            estimate: self.state.estimate(),
            dt,
            corrected: update.corrected,
            accel_magnitude: Some(update.accel_magnitude),
        }
    }

    /// Fuse one sample over the wall-clock time since the previous step
    pub fn advance(&mut self, sample: &ImuSample, now: Instant) -> StepOutcome {
        let dt = self.elapsed(now);
        let outcome = self.step(sample, dt);
        self.state.last_update = now;

        trace!(
            dt,
            corrected = outcome.corrected,
            pitch_deg = outcome.estimate.pitch_deg,
            roll_deg = outcome.estimate.roll_deg,
            "fusion step"
        );
        outcome
    }

    /// Integrate the last known rate over the time since the previous step,
    /// without accelerometer correction.
    ///
    /// Returns `None` before the first sample has been fused.
    pub fn free_run(&mut self, now: Instant) -> Option<StepOutcome> {
        let rate = self.last_rate?;
        let dt = self.elapsed(now);

        self.filter
            .integrate(&mut self.state.pitch, &mut self.state.roll, &rate, dt);
        self.state.last_update = now;

        trace!(dt, "fusion free-run step");
        Some(StepOutcome {
            estimate: self.state.estimate(),
            dt,
            corrected: false,
            accel_magnitude: None,
        })
    }

    fn elapsed(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.state.last_update)
            .as_secs_f64()
    }
}

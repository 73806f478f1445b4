//! # Fusion
//!
//! Attitude fusion engine.
//!
//! Responsibilities:
//! - Scale raw gyro readings and integrate them into pitch/roll
//! - Gate accelerometer correction on near-1 g specific force
//! - Blend the gravity-derived tilt in with a complementary filter
//! - Produce `AttitudeEstimate` and the outbound payload fields
//!
//! Pure computation: no I/O, no errors. Inputs are validated at ingress.
//!
//! ## Usage Example
//!
//! ```ignore
//! use fusion::FusionEngine;
//! use std::time::Instant;
//!
//! let mut engine = FusionEngine::new(&blueprint.fusion, Instant::now());
//!
//! if let Some(sample) = slot.take() {
//!     let outcome = engine.advance(&sample, Instant::now());
//!     publish(outcome.estimate);
//! }
//! ```

mod engine;
mod filter;
mod state;

pub use contracts::{AttitudeEstimate, FusionConfig, ImuSample, OutputSchema};
pub use engine::{FusionEngine, StepOutcome};
pub use filter::{accel_tilt, AccelGate, ComplementaryFilter};
pub use state::{attitude_quaternion, FusionState};

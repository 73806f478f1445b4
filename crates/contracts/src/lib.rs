//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the IMU and
//! attitude data model, the two-part frame layout, the payload codec, the
//! configuration blueprint and the transport traits.
//! Business crates depend on this crate only, never on each other in reverse.
//!
//! ## Time Model
//! - `ImuSample::timestamp` is the sensor-reported time (seconds, f64), informational
//! - Fusion integrates over wall-clock time measured by the consumer

mod attitude;
mod blueprint;
mod codec;
mod error;
mod frame;
mod sample;
mod transport;

pub use attitude::*;
pub use blueprint::*;
pub use codec::PayloadFormat;
pub use error::*;
pub use frame::{Frame, MAX_DATAGRAM_SIZE};
pub use sample::*;
pub use transport::*;

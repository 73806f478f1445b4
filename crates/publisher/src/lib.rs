//! # Publisher
//!
//! Rate-controlled attitude publishing.
//!
//! Responsibilities:
//! - Wake on a fixed period with an absolute-deadline schedule (no drift)
//! - Take the freshest IMU sample, fuse it, apply the starvation policy
//! - Encode the estimate per output schema and payload format
//! - Publish a two-part frame; a publish failure stops the loop

pub mod encoder;
pub mod error;
pub mod publishers;
pub mod rate_loop;
pub mod stats;

pub use contracts::{FramePublisher, OutputSchema, StarvationPolicy};
pub use encoder::AttitudeEncoder;
pub use error::PublisherError;
pub use publishers::{channel_publisher, ChannelFramePublisher, LogPublisher, UdpFramePublisher};
pub use rate_loop::{FusionLoop, LoopConfig, LoopReport, StopReason};
pub use stats::{LoopStats, StatsSnapshot};

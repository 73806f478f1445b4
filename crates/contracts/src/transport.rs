//! Transport traits - bus input and output interfaces
//!
//! The fusion core only needs "deliver the next frame" and "publish this frame".
//! Socket, broker and in-process implementations live in `ingestion` and `publisher`.

use crate::{ContractError, Frame};

/// Inbound frame source
///
/// Implementations yield whole frames, exactly once each.
#[trait_variant::make(FrameSource: Send)]
pub trait LocalFrameSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Wait for the next frame
    ///
    /// # Errors
    /// Decode errors concern one frame only (see [`ContractError::is_decode`]);
    /// any other error means the source is unusable.
    async fn recv(&mut self) -> Result<Frame, ContractError>;
}

/// Outbound frame publisher
#[trait_variant::make(FramePublisher: Send)]
pub trait LocalFramePublisher {
    /// Publisher name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Publish one frame
    ///
    /// # Errors
    /// Returns publish error (should include context)
    async fn publish(&mut self, frame: &Frame) -> Result<(), ContractError>;

    /// Release transport resources
    async fn close(&mut self) -> Result<(), ContractError>;
}

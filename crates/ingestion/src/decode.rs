//! Frame to sample decoding.

use bytes::Bytes;
use contracts::{ContractError, Frame, ImuSample, PayloadFormat};

/// Topic filter plus payload decoder for IMU frames.
#[derive(Debug, Clone)]
pub struct SampleDecoder {
    topic: Bytes,
    format: PayloadFormat,
}

impl SampleDecoder {
    pub fn new(topic: impl Into<String>, format: PayloadFormat) -> Self {
        Self {
            topic: Bytes::from(topic.into()),
            format,
        }
    }

    pub fn topic(&self) -> &[u8] {
        &self.topic
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Decode a frame.
    ///
    /// `Ok(None)` means the topic did not match the filter. Errors are always
    /// decode-class (`ContractError::is_decode`) and the frame should be dropped.
    pub fn decode(&self, frame: &Frame) -> Result<Option<ImuSample>, ContractError> {
        if !frame.matches_topic(&self.topic) {
            return Ok(None);
        }
        let fields = self.format.decode(&frame.payload)?;
        ImuSample::from_fields(&fields).map(Some)
    }
}

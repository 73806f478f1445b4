//! Attitude frame encoding

use bytes::Bytes;
use contracts::{
    AttitudeBlueprint, ContractError, Frame, OutputSchema, PayloadFormat, ATTITUDE_FIELD_COUNT,
};

/// Builds outbound attitude frames under a fixed topic
#[derive(Debug, Clone)]
pub struct AttitudeEncoder {
    topic: Bytes,
    schema: OutputSchema,
    format: PayloadFormat,
}

impl AttitudeEncoder {
    pub fn new(topic: impl Into<String>, schema: OutputSchema, format: PayloadFormat) -> Self {
        Self {
            topic: Bytes::from(topic.into()),
            schema,
            format,
        }
    }

    /// Topic, schema and format as configured
    pub fn from_blueprint(blueprint: &AttitudeBlueprint) -> Self {
        Self::new(
            blueprint.transport.attitude_topic.clone(),
            blueprint.publisher.output_schema,
            blueprint.transport.payload_format,
        )
    }

    pub fn schema(&self) -> OutputSchema {
        self.schema
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    pub fn encode(&self, fields: &[f64; ATTITUDE_FIELD_COUNT]) -> Result<Frame, ContractError> {
        let payload = self.format.encode(fields)?;
        Ok(Frame::new(self.topic.clone(), payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_euler_frame() {
        let encoder = AttitudeEncoder::new("att", OutputSchema::Euler, PayloadFormat::Json);
        let frame = encoder.encode(&[1.5, -2.0, 0.0, 0.0]).unwrap();

        assert_eq!(&frame.topic[..], b"att");
        assert_eq!(&frame.payload[..], b"[1.5,-2.0,0.0,0.0]");
    }

    #[test]
    fn test_encode_bincode_roundtrip() {
        let encoder = AttitudeEncoder::new("att", OutputSchema::Quaternion, PayloadFormat::Bincode);
        let frame = encoder.encode(&[1.0, 0.0, 0.0, 0.0]).unwrap();
        let fields = PayloadFormat::Bincode.decode(&frame.payload).unwrap();
        assert_eq!(fields, vec![1.0, 0.0, 0.0, 0.0]);
    }
}

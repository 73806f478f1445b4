//! Frame - two-part bus message
//!
//! A frame is `(topic, payload)`. On datagram transports both parts travel in one
//! datagram: `[topic_len: u16 BE][topic bytes][payload bytes]`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::ContractError;

const TOPIC_LEN_PREFIX: usize = 2;

/// Largest payload a single UDP datagram can carry over IPv4
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Two-part message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Topic used for subscriber-side filtering
    pub topic: Bytes,

    /// Encoded payload
    pub payload: Bytes,
}

impl Frame {
    pub fn new(topic: impl Into<Bytes>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Prefix match, the way pub/sub topic filters work. An empty filter matches all.
    pub fn matches_topic(&self, filter: &[u8]) -> bool {
        self.topic.starts_with(filter)
    }

    /// Pack both parts into a single datagram
    pub fn encode(&self) -> Result<Bytes, ContractError> {
        let topic_len = u16::try_from(self.topic.len()).map_err(|_| {
            ContractError::frame_layout(format!("topic too long: {} bytes", self.topic.len()))
        })?;

        let mut buf =
            BytesMut::with_capacity(TOPIC_LEN_PREFIX + self.topic.len() + self.payload.len());
        buf.put_u16(topic_len);
        buf.put_slice(&self.topic);
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Split a datagram back into its two parts (zero-copy)
    pub fn decode(mut datagram: Bytes) -> Result<Self, ContractError> {
        if datagram.len() < TOPIC_LEN_PREFIX {
            return Err(ContractError::frame_layout(format!(
                "datagram too short: {} bytes",
                datagram.len()
            )));
        }

        let topic_len = datagram.get_u16() as usize;
        if datagram.len() < topic_len {
            return Err(ContractError::frame_layout(format!(
                "topic length {} exceeds remaining {} bytes",
                topic_len,
                datagram.len()
            )));
        }

        let topic = datagram.split_to(topic_len);
        Ok(Self {
            topic,
            payload: datagram,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let frame = Frame::new(&b"imu"[..], &b"\x01\x02"[..]);
        let bytes = frame.encode().unwrap();
        assert_eq!(&bytes[..], b"\x00\x03imu\x01\x02");
        assert_eq!(Frame::decode(bytes).unwrap(), frame);
    }

    #[test]
    fn test_decode_empty_payload() {
        let frame = Frame::decode(Bytes::from_static(b"\x00\x03att")).unwrap();
        assert_eq!(&frame.topic[..], b"att");
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_decode_truncated() {
        assert!(Frame::decode(Bytes::from_static(b"\x00")).is_err());
        let err = Frame::decode(Bytes::from_static(b"\x00\x09imu")).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_topic_prefix_filter() {
        let frame = Frame::new(&b"imu_front"[..], Bytes::new());
        assert!(frame.matches_topic(b"imu"));
        assert!(frame.matches_topic(b""));
        assert!(!frame.matches_topic(b"att"));
        assert!(!frame.matches_topic(b"imu_front_left"));
    }
}

//! UDP subscriber socket.
//!
//! Each datagram carries one two-part frame. Binding happens once at startup;
//! a bind failure is fatal, everything after that is per-datagram.

use std::net::SocketAddr;

use bytes::Bytes;
use contracts::{ContractError, Frame, FrameSource, MAX_DATAGRAM_SIZE};
use tokio::net::UdpSocket;
use tracing::{debug, info, instrument};

/// Frame source bound to a local UDP endpoint
pub struct UdpFrameSource {
    name: String,
    socket: UdpSocket,
    buf: Vec<u8>,
    max_packet_size: usize,
}

impl UdpFrameSource {
    /// Bind the subscriber socket.
    ///
    /// `max_packet_size` must lie in `1..=MAX_DATAGRAM_SIZE`.
    #[instrument(name = "udp_source_bind", skip(name), fields(source = %name.as_ref()))]
    pub async fn bind(
        name: impl AsRef<str>,
        endpoint: &str,
        max_packet_size: usize,
    ) -> Result<Self, ContractError> {
        if max_packet_size == 0 || max_packet_size > MAX_DATAGRAM_SIZE {
            return Err(ContractError::transport_connection(
                endpoint,
                format!("max_packet_size {max_packet_size} outside 1..={MAX_DATAGRAM_SIZE}"),
            ));
        }

        let socket = UdpSocket::bind(endpoint)
            .await
            .map_err(|e| ContractError::transport_connection(endpoint, e.to_string()))?;

        let local = socket
            .local_addr()
            .map_err(|e| ContractError::transport_connection(endpoint, e.to_string()))?;
        info!(local_addr = %local, max_packet_size, "UDP frame source bound");

        Ok(Self {
            name: name.as_ref().to_string(),
            socket,
            // One spare byte so oversized datagrams are detected instead of silently truncated
            buf: vec![0u8; max_packet_size + 1],
            max_packet_size,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ContractError> {
        self.socket
            .local_addr()
            .map_err(|e| ContractError::transport_receive(&self.name, e.to_string()))
    }
}

impl FrameSource for UdpFrameSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recv(&mut self) -> Result<Frame, ContractError> {
        let (len, peer) = self
            .socket
            .recv_from(&mut self.buf)
            .await
            .map_err(|e| ContractError::transport_receive(&self.name, e.to_string()))?;

        if len > self.max_packet_size {
            return Err(ContractError::frame_layout(format!(
                "datagram from {peer} exceeds max_packet_size {}",
                self.max_packet_size
            )));
        }

        debug!(source = %self.name, %peer, len, "datagram received");
        Frame::decode(Bytes::copy_from_slice(&self.buf[..len]))
    }
}

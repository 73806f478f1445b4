//! UdpFramePublisher - fire-and-forget datagrams to a fixed endpoint

use std::net::SocketAddr;

use contracts::{ContractError, Frame, FramePublisher};
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info, instrument};

/// Publisher that sends each frame as one UDP datagram
///
/// The socket is left unconnected so a missing subscriber never turns into a
/// send error.
pub struct UdpFramePublisher {
    name: String,
    target: SocketAddr,
    max_packet_size: usize,
    socket: Option<UdpSocket>,
}

impl UdpFramePublisher {
    /// Resolve `endpoint` and open the sending socket
    #[instrument(name = "udp_publisher_connect", skip(name), fields(publisher = %name.as_ref()))]
    pub async fn connect(
        name: impl AsRef<str>,
        endpoint: &str,
        max_packet_size: usize,
    ) -> Result<Self, ContractError> {
        let target = lookup_host(endpoint)
            .await
            .map_err(|e| ContractError::transport_connection(endpoint, e.to_string()))?
            .next()
            .ok_or_else(|| ContractError::transport_connection(endpoint, "no address resolved"))?;

        let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| ContractError::transport_connection(endpoint, e.to_string()))?;

        info!(target = %target, "UDP frame publisher ready");

        Ok(Self {
            name: name.as_ref().to_string(),
            target,
            max_packet_size,
            socket: Some(socket),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::transport_publish(&self.name, "socket closed"))
    }
}

impl FramePublisher for UdpFramePublisher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, frame: &Frame) -> Result<(), ContractError> {
        let datagram = frame.encode()?;
        if datagram.len() > self.max_packet_size {
            return Err(ContractError::transport_publish(
                &self.name,
                format!(
                    "frame of {} bytes exceeds max_packet_size {}",
                    datagram.len(),
                    self.max_packet_size
                ),
            ));
        }

        let sent = self
            .socket()?
            .send_to(&datagram, self.target)
            .await
            .map_err(|e| ContractError::transport_publish(&self.name, e.to_string()))?;

        debug!(publisher = %self.name, bytes = sent, "datagram sent");
        Ok(())
    }

    #[instrument(name = "udp_publisher_close", skip(self), fields(publisher = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if self.socket.take().is_some() {
            info!("UDP frame publisher closed");
        }
        Ok(())
    }
}

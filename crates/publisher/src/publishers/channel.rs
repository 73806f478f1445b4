//! In-process publisher backed by an mpsc channel.

use contracts::{ContractError, Frame, FramePublisher};
use tokio::sync::mpsc;

/// Create a bounded channel whose sending end is a `FramePublisher`.
pub fn channel_publisher(
    name: impl Into<String>,
    capacity: usize,
) -> (ChannelFramePublisher, mpsc::Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelFramePublisher::new(name, tx), rx)
}

/// Publisher forwarding frames into an mpsc sender
pub struct ChannelFramePublisher {
    name: String,
    tx: Option<mpsc::Sender<Frame>>,
}

impl ChannelFramePublisher {
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<Frame>) -> Self {
        Self {
            name: name.into(),
            tx: Some(tx),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }
}

impl FramePublisher for ChannelFramePublisher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, frame: &Frame) -> Result<(), ContractError> {
        let tx = self.tx.as_ref().ok_or_else(|| ContractError::TransportClosed {
            name: self.name.clone(),
        })?;
        tx.send(frame.clone())
            .await
            .map_err(|_| ContractError::transport_publish(&self.name, "receiver dropped"))
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.tx = None;
        Ok(())
    }
}

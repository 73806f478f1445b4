//! In-process frame source backed by an mpsc channel.

use contracts::{ContractError, Frame, FrameSource};
use tokio::sync::mpsc;

/// Create a bounded channel whose receiving end is a `FrameSource`.
pub fn channel_source(
    name: impl Into<String>,
    capacity: usize,
) -> (mpsc::Sender<Frame>, ChannelFrameSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelFrameSource::new(name, rx))
}

/// Frame source reading from an mpsc receiver
pub struct ChannelFrameSource {
    name: String,
    rx: mpsc::Receiver<Frame>,
}

impl ChannelFrameSource {
    pub fn new(name: impl Into<String>, rx: mpsc::Receiver<Frame>) -> Self {
        Self {
            name: name.into(),
            rx,
        }
    }
}

impl FrameSource for ChannelFrameSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recv(&mut self) -> Result<Frame, ContractError> {
        self.rx.recv().await.ok_or_else(|| ContractError::TransportClosed {
            name: self.name.clone(),
        })
    }
}

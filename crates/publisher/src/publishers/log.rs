//! LogPublisher - logs attitude frames via tracing

use contracts::{ContractError, Frame, FramePublisher, PayloadFormat};
use tracing::{info, instrument};

/// Publisher that logs decoded attitude fields instead of sending them
pub struct LogPublisher {
    name: String,
    format: PayloadFormat,
}

impl LogPublisher {
    pub fn new(name: impl Into<String>, format: PayloadFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }
}

impl FramePublisher for LogPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&mut self, frame: &Frame) -> Result<(), ContractError> {
        let fields = self.format.decode(&frame.payload)?;
        info!(
            publisher = %self.name,
            topic = %String::from_utf8_lossy(&frame.topic),
            fields = ?fields,
            "attitude"
        );
        Ok(())
    }

    #[instrument(name = "log_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(publisher = %self.name, "LogPublisher closed");
        Ok(())
    }
}

//! Publisher error types

use contracts::ContractError;
use thiserror::Error;

/// Publisher-specific errors
#[derive(Debug, Error)]
pub enum PublisherError {
    /// Publish failed after startup; the loop has stopped and the publisher is closed
    #[error("publisher '{publisher}' failed at cycle {cycle}: {source}")]
    Publish {
        publisher: String,
        cycle: u64,
        #[source]
        source: ContractError,
    },

    /// Estimate could not be encoded
    #[error("failed to encode attitude at cycle {cycle}: {source}")]
    Encode {
        cycle: u64,
        #[source]
        source: ContractError,
    },

    /// Contract-level error (connect/close)
    #[error("publisher error: {0}")]
    Contract(#[from] ContractError),
}

impl PublisherError {
    /// Create a publish error
    pub fn publish(publisher: impl Into<String>, cycle: u64, source: ContractError) -> Self {
        Self::Publish {
            publisher: publisher.into(),
            cycle,
            source,
        }
    }
}

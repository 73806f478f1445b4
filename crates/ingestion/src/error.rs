//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Source failed after startup; ingestion cannot continue
    #[error("frame source '{source_name}' failed: {source}")]
    Transport {
        /// Source name
        source_name: String,
        /// Underlying transport error
        #[source]
        source: ContractError,
    },

    /// Ingress task panicked or was aborted
    #[error("ingress task failed: {message}")]
    TaskFailed {
        /// Join error message
        message: String,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;

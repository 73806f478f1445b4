//! Error types for CLI operations.

use contracts::ContractError;
use ingestion::IngestionError;
use publisher::PublisherError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[source] ContractError),

    /// Transport could not be bound or connected at startup
    #[error("Failed to open {role} transport: {source}")]
    Connection {
        role: &'static str,
        #[source]
        source: ContractError,
    },

    /// Ingress task failed while running
    #[error("Ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    /// Fusion loop stopped on a publish failure
    #[error("Publishing failed: {0}")]
    Publisher(#[from] PublisherError),

    /// A pipeline task panicked
    #[error("Task '{task}' failed: {message}")]
    Task { task: &'static str, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn connection(role: &'static str, source: ContractError) -> Self {
        Self::Connection { role, source }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

//! Layered error definitions
//!
//! Categorized by source: config / transport / decode

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Bind/connect failure
    #[error("transport '{endpoint}' connection error: {message}")]
    TransportConnection { endpoint: String, message: String },

    /// Receive failure after startup
    #[error("transport '{name}' receive error: {message}")]
    TransportReceive { name: String, message: String },

    /// Publish failure after startup
    #[error("transport '{name}' publish error: {message}")]
    TransportPublish { name: String, message: String },

    /// The peer side of an in-process transport went away
    #[error("transport '{name}' closed")]
    TransportClosed { name: String },

    // ===== Decode Errors =====
    /// Two-part frame layout is malformed
    #[error("malformed frame: {message}")]
    FrameLayout { message: String },

    /// Payload could not be decoded into a list of numbers
    #[error("payload decode error ({format}): {message}")]
    PayloadDecode { format: String, message: String },

    /// Payload decoded but has the wrong number of fields
    #[error("expected {expected} payload fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// A field is NaN or infinite
    #[error("payload field {index} is not finite: {value}")]
    NonFiniteField { index: usize, value: f64 },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport connection error
    pub fn transport_connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportConnection {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create transport receive error
    pub fn transport_receive(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportReceive {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create transport publish error
    pub fn transport_publish(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportPublish {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create malformed frame error
    pub fn frame_layout(message: impl Into<String>) -> Self {
        Self::FrameLayout {
            message: message.into(),
        }
    }

    /// Whether the error only concerns one inbound frame.
    ///
    /// Decode errors drop the frame; everything else is fatal to the stream.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::FrameLayout { .. }
                | Self::PayloadDecode { .. }
                | Self::FieldCount { .. }
                | Self::NonFiniteField { .. }
        )
    }
}

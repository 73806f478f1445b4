//! Payload codec - ordered list of numbers

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Serialization format for frame payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// Bincode (binary, compact): u64 LE length followed by f64 LE values
    #[default]
    Bincode,
    /// JSON array of numbers (human-readable, larger).
    /// JSON has no NaN or infinity, so such fields are refused on encode.
    Json,
}

impl PayloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bincode => "bincode",
            Self::Json => "json",
        }
    }

    /// Serialize a list of numbers
    pub fn encode(&self, fields: &[f64]) -> Result<Vec<u8>, ContractError> {
        match self {
            Self::Bincode => bincode_options()
                .serialize(fields)
                .map_err(|e| ContractError::Other(format!("bincode error: {e}"))),
            Self::Json => {
                if let Some((index, &value)) =
                    fields.iter().enumerate().find(|(_, v)| !v.is_finite())
                {
                    return Err(ContractError::NonFiniteField { index, value });
                }
                serde_json::to_vec(fields)
                    .map_err(|e| ContractError::Other(format!("json error: {e}")))
            }
        }
    }

    /// Deserialize a list of numbers
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<f64>, ContractError> {
        let decoded = match self {
            Self::Bincode => bincode_options()
                .deserialize::<Vec<f64>>(payload)
                .map_err(|e| e.to_string()),
            Self::Json => serde_json::from_slice::<Vec<f64>>(payload).map_err(|e| e.to_string()),
        };

        decoded.map_err(|message| ContractError::PayloadDecode {
            format: self.as_str().to_string(),
            message,
        })
    }
}

/// Same wire layout as `bincode::serialize`, but a payload must be consumed exactly
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

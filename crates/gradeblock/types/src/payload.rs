use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

/// Errors raised while encoding or decoding payloads.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload encoding failed: {0}")]
    Encode(String),

    #[error("payload decoding failed: {0}")]
    Decode(String),
}

/// Opaque byte blob: the details of a record or the pending change of a
/// proposal.
///
/// The core never interprets payload bytes except to hash them. Structured
/// values are turned into bytes with [`Payload::encode`], which produces
/// canonical JSON (object keys sorted, no insignificant whitespace) so the
/// same logical value always yields the same bytes.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Canonically encode a structured value.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, PayloadError> {
        // Round-tripping through `Value` sorts object keys.
        let value =
            serde_json::to_value(value).map_err(|e| PayloadError::Encode(e.to_string()))?;
        let bytes = serde_json::to_vec(&value).map_err(|e| PayloadError::Encode(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Decode a payload produced by [`Payload::encode`].
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        serde_json::from_slice(&self.0).map_err(|e| PayloadError::Decode(e.to_string()))
    }

    /// The payload of an ownership-transfer proposal.
    pub fn for_owner(owner: &Address) -> Result<Self, PayloadError> {
        Self::encode(owner)
    }

    /// Interpret this payload as an ownership-transfer target.
    pub fn as_owner(&self) -> Option<Address> {
        self.decode::<Address>().ok()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) if text.len() <= 64 => write!(f, "Payload({text})"),
            _ => write!(f, "Payload({} bytes)", self.0.len()),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Payload {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

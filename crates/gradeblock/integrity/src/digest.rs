use std::fmt;

use gradeblock_types::{Payload, PayloadError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain separation tag mixed into every record fingerprint.
pub const FINGERPRINT_DOMAIN: &[u8] = b"gradeblock-record-fingerprint-v1:";

#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("canonical serialization failed: {0}")]
    Canonicalization(#[from] PayloadError),

    #[error("invalid digest hex: {0}")]
    InvalidHex(String),
}

/// Fixed-size (32-byte) content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(text: &str) -> Result<Self, IntegrityError> {
        let raw = hex::decode(text).map_err(|e| IntegrityError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|v: Vec<u8>| IntegrityError::InvalidHex(format!("length {}", v.len())))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Digest::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Fingerprint of a payload's bytes.
pub fn fingerprint(payload: &Payload) -> Digest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(FINGERPRINT_DOMAIN);
    hasher.update(payload.as_bytes());
    Digest(*hasher.finalize().as_bytes())
}

/// Fingerprint of a structured value after canonical encoding.
///
/// Equal logical values hash identically regardless of field order.
pub fn fingerprint_value<T: Serialize>(value: &T) -> Result<Digest, IntegrityError> {
    let payload = Payload::encode(value)?;
    Ok(fingerprint(&payload))
}

use gradeblock_governance::{ErrorKind, GovernanceError};
use gradeblock_integrity::{Digest, IntegrityError};
use gradeblock_types::{Address, PayloadError};
use thiserror::Error;

/// Errors from record store operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("access denied: {0} may not read this record")]
    AccessDenied(Address),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no changes detected: new details hash to the stored fingerprint")]
    NoChangeDetected,

    #[error("record integrity check failed: stored {stored}, computed {computed}")]
    IntegrityCheckFailed { stored: Digest, computed: Digest },

    #[error("payload encoding error: {0}")]
    Payload(#[from] PayloadError),

    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("governance error: {0}")]
    Governance(#[from] GovernanceError),
}

impl RecordError {
    /// Position of this error in the shared failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::InvalidInput(_) | Self::Payload(_) | Self::Integrity(_) => ErrorKind::InvalidInput,
            Self::NoChangeDetected => ErrorKind::NoChangeDetected,
            Self::IntegrityCheckFailed { .. } => ErrorKind::IntegrityCheckFailed,
            Self::Governance(err) => err.kind(),
        }
    }
}

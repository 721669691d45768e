//! Error types for the ledger host

use gradeblock_governance::{ErrorKind, GovernanceError};
use gradeblock_record::RecordError;
use gradeblock_types::Address;
use thiserror::Error;

use crate::instance::InstanceKind;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised while deploying instances or delivering transactions.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no instance deployed at {0}")]
    UnknownInstance(Address),

    #[error("address {0} is already in use")]
    AddressInUse(Address),

    #[error("instance address is null")]
    NullAddress,

    #[error("{kind} instance at {target} has no entry point '{entrypoint}'")]
    WrongEntryPoint {
        target: Address,
        kind: InstanceKind,
        entrypoint: &'static str,
    },

    #[error("instance {0} state is poisoned")]
    StatePoisoned(Address),

    #[error("sequencer is closed")]
    SequencerClosed,

    #[error("receipt chain broken at sequence {sequence}")]
    ReceiptChainBroken { sequence: u64 },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl LedgerError {
    /// Taxonomy kind for failures raised by the governed core. Host-level
    /// failures have none.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Governance(err) => Some(err.kind()),
            Self::Record(err) => Some(err.kind()),
            _ => None,
        }
    }
}

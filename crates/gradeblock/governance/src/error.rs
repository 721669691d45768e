use gradeblock_types::{Address, ProposalId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::Operation;

/// Errors from proposal governance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("unauthorized: {caller} may not {operation}")]
    Unauthorized {
        caller: Address,
        operation: Operation,
    },

    #[error("proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("insufficient approvals for proposal {id}: {approvals} of {threshold}")]
    InsufficientApprovals {
        id: ProposalId,
        approvals: usize,
        threshold: usize,
    },

    #[error("invalid threshold: {threshold} with {signatories} signatories")]
    InvalidThreshold {
        threshold: usize,
        signatories: usize,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("registry endpoint error: {0}")]
    Endpoint(String),
}

/// The failure taxonomy shared by every GradeBlock entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    AccessDenied,
    ProposalNotFound,
    InvalidProposal,
    InsufficientApprovals,
    InvalidInput,
    NoChangeDetected,
    IntegrityCheckFailed,
    InvalidThreshold,
    Unsupported,
    Endpoint,
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::ProposalNotFound(_) => ErrorKind::ProposalNotFound,
            Self::InvalidProposal(_) => ErrorKind::InvalidProposal,
            Self::InsufficientApprovals { .. } => ErrorKind::InsufficientApprovals,
            Self::InvalidThreshold { .. } => ErrorKind::InvalidThreshold,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Endpoint(_) => ErrorKind::Endpoint,
        }
    }

    pub fn unauthorized(caller: &Address, operation: Operation) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            operation,
        }
    }
}

//! Message-based access to a standalone [`Multisig`].
//!
//! A record that delegates governance never holds the multisig itself; it
//! holds an endpoint and the registry's address, and reaches the registry's
//! entry points by sending [`RegistryMessage`]s with itself as sender.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use gradeblock_types::{Address, CallContext, Payload, ProposalId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GovernanceError;
use crate::multisig::Multisig;

/// Entry points of the standalone multisig.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entrypoint", rename_all = "snake_case")]
pub enum RegistryMessage {
    Propose {
        payload: Payload,
        id: Option<ProposalId>,
        #[serde(default)]
        target: Option<Address>,
    },
    Approve { id: ProposalId },
    Execute { id: ProposalId },
    RemoveProposal { id: ProposalId },
    AddSignatory { address: Address },
    RemoveSignatory { address: Address },
    ChangeThreshold { threshold: usize },
    AuthorizeConsumer { address: Address },
    RevokeConsumer { address: Address },
    ThresholdMet { id: ProposalId },
    ProposalPayload { id: ProposalId },
    ProposalApprovals { id: ProposalId },
    ProposalStatus { id: ProposalId },
}

impl RegistryMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Propose { .. } => "propose",
            Self::Approve { .. } => "approve",
            Self::Execute { .. } => "execute",
            Self::RemoveProposal { .. } => "remove_proposal",
            Self::AddSignatory { .. } => "add_signatory",
            Self::RemoveSignatory { .. } => "remove_signatory",
            Self::ChangeThreshold { .. } => "change_threshold",
            Self::AuthorizeConsumer { .. } => "authorize_consumer",
            Self::RevokeConsumer { .. } => "revoke_consumer",
            Self::ThresholdMet { .. } => "threshold_met",
            Self::ProposalPayload { .. } => "proposal_payload",
            Self::ProposalApprovals { .. } => "proposal_approvals",
            Self::ProposalStatus { .. } => "proposal_status",
        }
    }
}

/// Result of a delivered [`RegistryMessage`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", content = "value", rename_all = "snake_case")]
pub enum RegistryReply {
    Done,
    Proposed(ProposalId),
    Payload(Payload),
    ThresholdMet(bool),
    Approvals(BTreeSet<Address>),
    Status(ProposalStatus),
}

/// Approval progress of one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalStatus {
    pub id: ProposalId,
    pub approvals: usize,
    pub threshold: usize,
    pub target: Option<Address>,
}

impl ProposalStatus {
    pub fn is_met(&self) -> bool {
        self.approvals >= self.threshold
    }

    /// Fail with `InsufficientApprovals` unless the threshold is met.
    pub fn ensure_met(&self) -> Result<(), GovernanceError> {
        if self.is_met() {
            Ok(())
        } else {
            Err(GovernanceError::InsufficientApprovals {
                id: self.id,
                approvals: self.approvals,
                threshold: self.threshold,
            })
        }
    }
}

impl RegistryReply {
    fn unexpected(&self, wanted: &str) -> GovernanceError {
        GovernanceError::Endpoint(format!("expected {wanted} reply, got {self:?}"))
    }

    pub fn into_proposal_id(self) -> Result<ProposalId, GovernanceError> {
        match self {
            Self::Proposed(id) => Ok(id),
            other => Err(other.unexpected("proposed")),
        }
    }

    pub fn into_payload(self) -> Result<Payload, GovernanceError> {
        match self {
            Self::Payload(payload) => Ok(payload),
            other => Err(other.unexpected("payload")),
        }
    }

    pub fn into_threshold_met(self) -> Result<bool, GovernanceError> {
        match self {
            Self::ThresholdMet(met) => Ok(met),
            other => Err(other.unexpected("threshold")),
        }
    }

    pub fn into_approvals(self) -> Result<BTreeSet<Address>, GovernanceError> {
        match self {
            Self::Approvals(set) => Ok(set),
            other => Err(other.unexpected("approvals")),
        }
    }

    pub fn into_status(self) -> Result<ProposalStatus, GovernanceError> {
        match self {
            Self::Status(status) => Ok(status),
            other => Err(other.unexpected("status")),
        }
    }

    pub fn into_done(self) -> Result<(), GovernanceError> {
        match self {
            Self::Done => Ok(()),
            other => Err(other.unexpected("done")),
        }
    }
}

/// Delivery channel to an independently addressed registry.
pub trait RegistryEndpoint {
    /// Address of the registry this endpoint reaches.
    fn registry(&self) -> &Address;

    /// Deliver `message` to the registry with `ctx.sender` as the
    /// authenticated sender.
    fn send(&self, ctx: &CallContext, message: RegistryMessage) -> Result<RegistryReply, GovernanceError>;
}

/// A multisig that several instances in one process can reach.
pub type SharedMultisig = Arc<Mutex<Multisig>>;

/// In-process endpoint backed by a [`SharedMultisig`].
#[derive(Clone, Debug)]
pub struct LocalEndpoint {
    registry: Address,
    target: SharedMultisig,
}

impl LocalEndpoint {
    pub fn new(registry: Address, target: SharedMultisig) -> Self {
        Self { registry, target }
    }

    pub fn target(&self) -> &SharedMultisig {
        &self.target
    }
}

impl RegistryEndpoint for LocalEndpoint {
    fn registry(&self) -> &Address {
        &self.registry
    }

    fn send(&self, ctx: &CallContext, message: RegistryMessage) -> Result<RegistryReply, GovernanceError> {
        debug!(
            registry = %self.registry,
            sender = %ctx.sender,
            entrypoint = message.name(),
            "Delivering registry message"
        );
        let mut multisig = self
            .target
            .lock()
            .map_err(|_| GovernanceError::Endpoint(format!("registry {} lock poisoned", self.registry)))?;
        multisig.handle(ctx, message)
    }
}

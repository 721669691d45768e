use std::collections::BTreeSet;

use gradeblock_governance::{AccessPolicy, GovernanceError};
use gradeblock_types::{Address, CallContext, Payload, ProposalId};
use serde::{Deserialize, Serialize};

/// Which governance path a record uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    Embedded,
    Delegated { registry: Address },
}

/// How the consumed proposal was disposed of after a committed change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// The proposal no longer exists.
    Settled,
    /// The change committed locally but the external registry still holds
    /// the proposal; removal will be retried.
    RemovalPending,
}

/// Source of governance decisions for a [`RecordStore`](crate::RecordStore).
///
/// The store performs owner and signatory authorization itself using
/// [`GovernanceProvider::access_policy`]; providers only run the proposal
/// lifecycle.
pub trait GovernanceProvider {
    fn topology(&self) -> Topology;

    /// Policy the record applies to its own entry points.
    fn access_policy(&self) -> AccessPolicy;

    /// Addresses allowed to approve, when approvals are restricted.
    fn signatories(&self) -> Option<&BTreeSet<Address>>;

    fn propose(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        id: Option<ProposalId>,
    ) -> Result<ProposalId, GovernanceError>;

    fn approve(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), GovernanceError>;

    fn is_threshold_met(&self, ctx: &CallContext, id: ProposalId) -> Result<bool, GovernanceError>;

    fn approvals(&self, ctx: &CallContext, id: ProposalId) -> Result<BTreeSet<Address>, GovernanceError>;

    /// Payload of a proposal that has met its threshold. Fails with
    /// `InsufficientApprovals` otherwise.
    fn approved_payload(&self, ctx: &CallContext, id: ProposalId) -> Result<Payload, GovernanceError>;

    /// Dispose of a proposal whose change, `payload`, is about to commit.
    /// Called after all local validation has passed; an error aborts the
    /// commit.
    fn settle(
        &mut self,
        ctx: &CallContext,
        id: ProposalId,
        payload: &Payload,
    ) -> Result<Settlement, GovernanceError>;

    /// Delete a proposal without applying it.
    fn withdraw(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), GovernanceError>;

    /// Proposals applied locally whose removal is still outstanding.
    fn pending_removals(&self) -> Vec<ProposalId> {
        Vec::new()
    }
}

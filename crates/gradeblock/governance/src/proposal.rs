use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use gradeblock_types::{Address, CallContext, Payload, ProposalId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GovernanceError;

/// A pending change and the addresses that have endorsed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub payload: Payload,
    pub approvals: BTreeSet<Address>,
    pub proposer: Address,
    /// Instance allowed to apply and remove this proposal, if any.
    #[serde(default)]
    pub target: Option<Address>,
    pub proposed_at: DateTime<Utc>,
}

impl Proposal {
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    pub fn has_approved(&self, address: &Address) -> bool {
        self.approvals.contains(address)
    }

    pub fn meets(&self, threshold: usize) -> bool {
        self.approvals.len() >= threshold
    }

    pub fn is_aimed_at(&self, instance: &Address) -> bool {
        self.target.as_ref() == Some(instance)
    }
}

/// Mapping of proposal ids to proposals.
///
/// Ids come from a monotonic counter owned by the registry, never from the
/// current map size, so removing a proposal can never cause a later id to
/// be handed out twice. An explicitly requested id must not be below the
/// counter, and moves the counter past it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRegistry {
    proposals: BTreeMap<ProposalId, Proposal>,
    next_id: ProposalId,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new untargeted proposal with no approvals.
    pub fn insert(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        requested: Option<ProposalId>,
    ) -> Result<ProposalId, GovernanceError> {
        self.insert_for(ctx, payload, requested, None)
    }

    /// Insert a new proposal with no approvals, aimed at `target`.
    pub fn insert_for(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        requested: Option<ProposalId>,
        target: Option<Address>,
    ) -> Result<ProposalId, GovernanceError> {
        if payload.is_empty() {
            return Err(GovernanceError::InvalidInput(
                "proposal payload is empty".into(),
            ));
        }

        let id = match requested {
            Some(id) if self.proposals.contains_key(&id) => {
                return Err(GovernanceError::InvalidProposal(format!(
                    "proposal id {id} is already in use"
                )));
            }
            Some(id) if id < self.next_id => {
                return Err(GovernanceError::InvalidProposal(format!(
                    "proposal id {id} was already issued; next free id is {}",
                    self.next_id
                )));
            }
            Some(id) => id,
            None => self.next_id,
        };

        self.next_id = id.next();

        self.proposals.insert(
            id,
            Proposal {
                id,
                payload,
                approvals: BTreeSet::new(),
                proposer: ctx.sender.clone(),
                target,
                proposed_at: ctx.now,
            },
        );
        debug!(proposal_id = %id, proposer = %ctx.sender, "Proposal inserted");
        Ok(id)
    }

    /// Record an approval. Returns `false` when the address had already
    /// approved (the approval set is unchanged).
    pub fn approve(&mut self, id: ProposalId, approver: &Address) -> Result<bool, GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        Ok(proposal.approvals.insert(approver.clone()))
    }

    pub fn get(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn contains(&self, id: ProposalId) -> bool {
        self.proposals.contains_key(&id)
    }

    pub fn is_threshold_met(&self, id: ProposalId, threshold: usize) -> Result<bool, GovernanceError> {
        Ok(self.get(id)?.meets(threshold))
    }

    /// Fail with `InsufficientApprovals` unless the proposal has met the
    /// threshold.
    pub fn ensure_threshold(
        &self,
        id: ProposalId,
        threshold: usize,
    ) -> Result<&Proposal, GovernanceError> {
        let proposal = self.get(id)?;
        if !proposal.meets(threshold) {
            return Err(GovernanceError::InsufficientApprovals {
                id,
                approvals: proposal.approval_count(),
                threshold,
            });
        }
        Ok(proposal)
    }

    /// Consume a proposal that has met the threshold.
    pub fn execute(&mut self, id: ProposalId, threshold: usize) -> Result<Proposal, GovernanceError> {
        self.ensure_threshold(id, threshold)?;
        self.remove(id)
    }

    /// Delete a proposal without checking approvals.
    pub fn remove(&mut self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.proposals
            .remove(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn next_id(&self) -> ProposalId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }
}

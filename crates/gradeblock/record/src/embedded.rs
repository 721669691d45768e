use std::collections::BTreeSet;

use gradeblock_governance::{
    AccessPolicy, ApprovalPolicy, GovernanceConfig, GovernanceError, ProposalRegistry,
    SignatorySet,
};
use gradeblock_types::{Address, CallContext, Payload, ProposalId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::provider::{GovernanceProvider, Settlement, Topology};

/// Proposal registry carried inside the record itself.
///
/// Only the owner proposes. Who may approve depends on the
/// [`ApprovalPolicy`]: listed signatories by default, or any address in the
/// legacy unrestricted mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedGovernance {
    proposals: ProposalRegistry,
    threshold: usize,
    signatories: Option<SignatorySet>,
    approval_policy: ApprovalPolicy,
}

impl EmbeddedGovernance {
    /// Approvals restricted to `signatories`, using their threshold.
    pub fn with_signatories(signatories: SignatorySet) -> Self {
        Self {
            proposals: ProposalRegistry::new(),
            threshold: signatories.threshold(),
            signatories: Some(signatories),
            approval_policy: ApprovalPolicy::SignatoriesOnly,
        }
    }

    /// Any address may approve; `threshold` distinct approvals execute.
    pub fn unrestricted(threshold: usize) -> Result<Self, GovernanceError> {
        if threshold == 0 {
            return Err(GovernanceError::InvalidThreshold {
                threshold,
                signatories: 0,
            });
        }
        Ok(Self {
            proposals: ProposalRegistry::new(),
            threshold,
            signatories: None,
            approval_policy: ApprovalPolicy::Unrestricted,
        })
    }

    pub fn from_config(config: &GovernanceConfig) -> Result<Self, GovernanceError> {
        match config.approval_policy {
            ApprovalPolicy::SignatoriesOnly => Ok(Self::with_signatories(config.signatory_set()?)),
            ApprovalPolicy::Unrestricted => Self::unrestricted(config.threshold),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn approval_policy(&self) -> ApprovalPolicy {
        self.approval_policy
    }

    pub fn proposals(&self) -> &ProposalRegistry {
        &self.proposals
    }
}

impl GovernanceProvider for EmbeddedGovernance {
    fn topology(&self) -> Topology {
        Topology::Embedded
    }

    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::embedded(self.approval_policy)
    }

    fn signatories(&self) -> Option<&BTreeSet<Address>> {
        self.signatories.as_ref().map(SignatorySet::members)
    }

    fn propose(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        id: Option<ProposalId>,
    ) -> Result<ProposalId, GovernanceError> {
        let id = self.proposals.insert(ctx, payload, id)?;
        info!(proposal_id = %id, proposer = %ctx.sender, "Record proposal created");
        Ok(id)
    }

    fn approve(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), GovernanceError> {
        self.proposals.approve(id, &ctx.sender)?;
        info!(
            proposal_id = %id,
            approver = %ctx.sender,
            approvals = self.proposals.get(id)?.approval_count(),
            threshold = self.threshold,
            "Record proposal approved"
        );
        Ok(())
    }

    fn is_threshold_met(&self, _ctx: &CallContext, id: ProposalId) -> Result<bool, GovernanceError> {
        self.proposals.is_threshold_met(id, self.threshold)
    }

    fn approvals(&self, _ctx: &CallContext, id: ProposalId) -> Result<BTreeSet<Address>, GovernanceError> {
        Ok(self.proposals.get(id)?.approvals.clone())
    }

    fn approved_payload(&self, _ctx: &CallContext, id: ProposalId) -> Result<Payload, GovernanceError> {
        Ok(self.proposals.ensure_threshold(id, self.threshold)?.payload.clone())
    }

    fn settle(
        &mut self,
        _ctx: &CallContext,
        id: ProposalId,
        _payload: &Payload,
    ) -> Result<Settlement, GovernanceError> {
        self.proposals.execute(id, self.threshold)?;
        Ok(Settlement::Settled)
    }

    fn withdraw(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), GovernanceError> {
        self.proposals.remove(id)?;
        info!(proposal_id = %id, caller = %ctx.sender, "Record proposal withdrawn");
        Ok(())
    }
}

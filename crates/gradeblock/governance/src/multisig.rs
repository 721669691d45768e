use std::collections::BTreeSet;

use gradeblock_types::{Address, CallContext, Payload, ProposalId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::GovernanceError;
use crate::message::{ProposalStatus, RegistryMessage, RegistryReply};
use crate::policy::{AccessPolicy, Operation, Principals};
use crate::proposal::{Proposal, ProposalRegistry};
use crate::signatories::{GovernanceConfig, SignatorySet};

/// Standalone threshold multisig.
///
/// Signatories propose, approve, and administer membership. Authorized
/// consumers (record instances that delegate their governance here) may
/// propose and remove proposals but never vote. A consumer's proposals are
/// always aimed at the consumer itself, and a consumer may only remove
/// proposals aimed at it. Every entry point checks
/// all preconditions before mutating, so a failed call leaves the unit
/// untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multisig {
    signatories: SignatorySet,
    consumers: BTreeSet<Address>,
    proposals: ProposalRegistry,
    policy: AccessPolicy,
}

impl Multisig {
    pub fn new(signatories: SignatorySet) -> Self {
        Self {
            signatories,
            consumers: BTreeSet::new(),
            proposals: ProposalRegistry::new(),
            policy: AccessPolicy::standalone(),
        }
    }

    pub fn from_config(config: &GovernanceConfig) -> Result<Self, GovernanceError> {
        Ok(Self::new(config.signatory_set()?))
    }

    fn principals(&self) -> Principals<'_> {
        Principals {
            owner: None,
            signatories: Some(self.signatories.members()),
            consumers: Some(&self.consumers),
        }
    }

    fn authorize(&self, operation: Operation, caller: &Address) -> Result<(), GovernanceError> {
        self.policy.authorize(operation, caller, &self.principals())
    }

    fn is_signatory(&self, caller: &Address) -> bool {
        self.signatories.contains(caller)
    }

    /// Create a proposal. With `id = None` the next counter value is used.
    pub fn propose(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        id: Option<ProposalId>,
    ) -> Result<ProposalId, GovernanceError> {
        self.propose_for(ctx, payload, id, None)
    }

    /// Create a proposal aimed at the consumer instance `target`.
    ///
    /// Signatories may aim a proposal at any instance or at none. A
    /// consumer's proposal is aimed at the consumer whether or not it names
    /// itself; naming another instance fails with `InvalidProposal`.
    pub fn propose_for(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        id: Option<ProposalId>,
        target: Option<Address>,
    ) -> Result<ProposalId, GovernanceError> {
        self.authorize(Operation::Propose, &ctx.sender)?;
        let target = if self.is_signatory(&ctx.sender) {
            target
        } else {
            match target {
                Some(other) if other != ctx.sender => {
                    return Err(GovernanceError::InvalidProposal(format!(
                        "consumer {} cannot propose for {other}",
                        ctx.sender
                    )));
                }
                _ => Some(ctx.sender.clone()),
            }
        };
        let id = self.proposals.insert_for(ctx, payload, id, target.clone())?;
        info!(
            proposal_id = %id,
            proposer = %ctx.sender,
            ?target,
            "Proposal created"
        );
        Ok(id)
    }

    pub fn approve(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), GovernanceError> {
        self.authorize(Operation::Approve, &ctx.sender)?;
        let added = self.proposals.approve(id, &ctx.sender)?;
        let approvals = self.proposals.get(id)?.approval_count();
        info!(
            proposal_id = %id,
            approver = %ctx.sender,
            approvals,
            threshold = self.signatories.threshold(),
            repeated = !added,
            "Proposal approved"
        );
        Ok(())
    }

    pub fn is_threshold_met(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        self.proposals
            .is_threshold_met(id, self.signatories.threshold())
    }

    /// Consume an approved proposal and return its payload. Anyone may
    /// trigger execution once the threshold is met.
    pub fn execute(&mut self, ctx: &CallContext, id: ProposalId) -> Result<Payload, GovernanceError> {
        self.authorize(Operation::Execute, &ctx.sender)?;
        let proposal = self.proposals.execute(id, self.signatories.threshold())?;
        info!(proposal_id = %id, executor = %ctx.sender, "Proposal executed");
        Ok(proposal.payload)
    }

    /// Delete a proposal without executing it.
    pub fn remove_proposal(
        &mut self,
        ctx: &CallContext,
        id: ProposalId,
    ) -> Result<Proposal, GovernanceError> {
        self.authorize(Operation::Withdraw, &ctx.sender)?;
        if !self.is_signatory(&ctx.sender) && !self.proposals.get(id)?.is_aimed_at(&ctx.sender) {
            return Err(GovernanceError::unauthorized(&ctx.sender, Operation::Withdraw));
        }
        let proposal = self.proposals.remove(id)?;
        info!(proposal_id = %id, caller = %ctx.sender, "Proposal removed");
        Ok(proposal)
    }

    pub fn add_signatory(&mut self, ctx: &CallContext, address: Address) -> Result<(), GovernanceError> {
        self.authorize(Operation::ManageSignatories, &ctx.sender)?;
        self.signatories.add(address)?;
        Ok(())
    }

    pub fn remove_signatory(&mut self, ctx: &CallContext, address: &Address) -> Result<(), GovernanceError> {
        self.authorize(Operation::ManageSignatories, &ctx.sender)?;
        if address == &ctx.sender {
            warn!(signatory = %address, "Signatory removing itself");
        }
        self.signatories.remove(address)
    }

    pub fn change_threshold(&mut self, ctx: &CallContext, threshold: usize) -> Result<(), GovernanceError> {
        self.authorize(Operation::ChangeThreshold, &ctx.sender)?;
        self.signatories.change_threshold(threshold)
    }

    /// Allow a record instance to propose and remove proposals here.
    pub fn authorize_consumer(&mut self, ctx: &CallContext, address: Address) -> Result<(), GovernanceError> {
        self.authorize(Operation::ManageConsumers, &ctx.sender)?;
        if address.is_null() {
            return Err(GovernanceError::InvalidInput("null consumer address".into()));
        }
        info!(consumer = %address, "Consumer authorized");
        self.consumers.insert(address);
        Ok(())
    }

    pub fn revoke_consumer(&mut self, ctx: &CallContext, address: &Address) -> Result<(), GovernanceError> {
        self.authorize(Operation::ManageConsumers, &ctx.sender)?;
        if !self.consumers.remove(address) {
            return Err(GovernanceError::InvalidInput(format!(
                "{address} is not an authorized consumer"
            )));
        }
        info!(consumer = %address, "Consumer revoked");
        Ok(())
    }

    /// Dispatch an entry-point message.
    pub fn handle(
        &mut self,
        ctx: &CallContext,
        message: RegistryMessage,
    ) -> Result<RegistryReply, GovernanceError> {
        match message {
            RegistryMessage::Propose { payload, id, target } => self
                .propose_for(ctx, payload, id, target)
                .map(RegistryReply::Proposed),
            RegistryMessage::Approve { id } => self.approve(ctx, id).map(|_| RegistryReply::Done),
            RegistryMessage::Execute { id } => self.execute(ctx, id).map(RegistryReply::Payload),
            RegistryMessage::RemoveProposal { id } => {
                self.remove_proposal(ctx, id).map(|_| RegistryReply::Done)
            }
            RegistryMessage::AddSignatory { address } => {
                self.add_signatory(ctx, address).map(|_| RegistryReply::Done)
            }
            RegistryMessage::RemoveSignatory { address } => {
                self.remove_signatory(ctx, &address).map(|_| RegistryReply::Done)
            }
            RegistryMessage::ChangeThreshold { threshold } => {
                self.change_threshold(ctx, threshold).map(|_| RegistryReply::Done)
            }
            RegistryMessage::AuthorizeConsumer { address } => {
                self.authorize_consumer(ctx, address).map(|_| RegistryReply::Done)
            }
            RegistryMessage::RevokeConsumer { address } => {
                self.revoke_consumer(ctx, &address).map(|_| RegistryReply::Done)
            }
            RegistryMessage::ThresholdMet { id } => {
                self.is_threshold_met(id).map(RegistryReply::ThresholdMet)
            }
            RegistryMessage::ProposalPayload { id } => self
                .proposals
                .get(id)
                .map(|p| RegistryReply::Payload(p.payload.clone())),
            RegistryMessage::ProposalApprovals { id } => self
                .proposals
                .get(id)
                .map(|p| RegistryReply::Approvals(p.approvals.clone())),
            RegistryMessage::ProposalStatus { id } => {
                self.status(id).map(RegistryReply::Status)
            }
        }
    }

    pub fn status(&self, id: ProposalId) -> Result<ProposalStatus, GovernanceError> {
        let proposal = self.proposals.get(id)?;
        Ok(ProposalStatus {
            id,
            approvals: proposal.approval_count(),
            threshold: self.signatories.threshold(),
            target: proposal.target.clone(),
        })
    }

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals.get(id)
    }

    pub fn proposals(&self) -> &ProposalRegistry {
        &self.proposals
    }

    pub fn signatories(&self) -> &SignatorySet {
        &self.signatories
    }

    pub fn threshold(&self) -> usize {
        self.signatories.threshold()
    }

    pub fn consumers(&self) -> &BTreeSet<Address> {
        &self.consumers
    }
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use gradeblock_governance::{
    AccessPolicy, ApprovalPolicy, GovernanceError, RegistryEndpoint, RegistryMessage,
};
use gradeblock_integrity::{fingerprint, Digest};
use gradeblock_types::{Address, CallContext, Payload, ProposalId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::provider::{GovernanceProvider, Settlement, Topology};

/// What happens when the external registry refuses to delete a consumed
/// proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMode {
    /// Removal must succeed before the local change commits.
    #[default]
    Atomic,
    /// The local change commits anyway; the removal is queued for retry.
    Deferred,
}

/// A committed change whose proposal is still live in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRemoval {
    pub id: ProposalId,
    /// Fingerprint of the applied payload. A retry only removes the
    /// proposal while the registry still holds this payload under `id`.
    pub payload_hash: Digest,
    pub since: DateTime<Utc>,
    pub attempts: u32,
    pub last_error: String,
}

/// Outcome of [`DelegatedGovernance::retry_pending_removals`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryReport {
    pub cleared: Vec<ProposalId>,
    pub still_pending: Vec<ProposalId>,
}

/// Governance delegated to an external multisig.
///
/// The record instance talks to the registry only through `endpoint`,
/// always as itself (`instance`), so the registry must list the instance
/// as an authorized consumer. Approvals are collected by the registry
/// directly from its signatories. Only proposals the registry has aimed at
/// `instance` can be applied here.
///
/// Consuming a proposal is a two-instance step: the local commit and the
/// remote `remove_proposal`. The remote removal is sent first; under
/// [`RemovalMode::Atomic`] a refusal aborts the whole operation, under
/// [`RemovalMode::Deferred`] the commit proceeds and the proposal id is
/// kept in `pending` until a retry succeeds. While pending, the proposal
/// cannot be applied again.
#[derive(Clone, Debug)]
pub struct DelegatedGovernance<E> {
    instance: Address,
    endpoint: E,
    removal_mode: RemovalMode,
    pending: BTreeMap<ProposalId, PendingRemoval>,
}

impl<E: RegistryEndpoint> DelegatedGovernance<E> {
    pub fn new(instance: Address, endpoint: E) -> Self {
        Self {
            instance,
            endpoint,
            removal_mode: RemovalMode::default(),
            pending: BTreeMap::new(),
        }
    }

    pub fn with_removal_mode(mut self, mode: RemovalMode) -> Self {
        self.removal_mode = mode;
        self
    }

    pub fn instance(&self) -> &Address {
        &self.instance
    }

    pub fn registry(&self) -> &Address {
        self.endpoint.registry()
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn removal_mode(&self) -> RemovalMode {
        self.removal_mode
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingRemoval> {
        self.pending.values()
    }

    fn send(
        &self,
        ctx: &CallContext,
        message: RegistryMessage,
    ) -> Result<gradeblock_governance::RegistryReply, GovernanceError> {
        self.endpoint.send(&ctx.relay(&self.instance), message)
    }

    /// Re-send every outstanding removal. A proposal the registry no longer
    /// holds counts as removed, and so does an id that now holds a different
    /// payload; the latter is left untouched.
    pub fn retry_pending_removals(&mut self, ctx: &CallContext) -> RetryReport {
        let mut report = RetryReport::default();
        let pending: Vec<(ProposalId, Digest)> = self
            .pending
            .values()
            .map(|entry| (entry.id, entry.payload_hash))
            .collect();

        for (id, payload_hash) in pending {
            match self.remove_if_unchanged(ctx, id, payload_hash) {
                Ok(()) | Err(GovernanceError::ProposalNotFound(_)) => {
                    self.pending.remove(&id);
                    info!(proposal_id = %id, registry = %self.registry(), "Pending removal cleared");
                    report.cleared.push(id);
                }
                Err(err) => {
                    if let Some(entry) = self.pending.get_mut(&id) {
                        entry.attempts += 1;
                        entry.last_error = err.to_string();
                        warn!(
                            proposal_id = %id,
                            attempts = entry.attempts,
                            error = %err,
                            "Pending removal still refused"
                        );
                    }
                    report.still_pending.push(id);
                }
            }
        }
        report
    }

    fn remove_if_unchanged(
        &self,
        ctx: &CallContext,
        id: ProposalId,
        payload_hash: Digest,
    ) -> Result<(), GovernanceError> {
        let current = self
            .send(ctx, RegistryMessage::ProposalPayload { id })?
            .into_payload()?;
        if fingerprint(&current) != payload_hash {
            warn!(
                proposal_id = %id,
                registry = %self.registry(),
                "Registry holds a different proposal under a pending id; leaving it"
            );
            return Ok(());
        }
        self.send(ctx, RegistryMessage::RemoveProposal { id })?
            .into_done()
    }

    fn ensure_not_applied(&self, id: ProposalId) -> Result<(), GovernanceError> {
        if self.pending.contains_key(&id) {
            return Err(GovernanceError::InvalidProposal(format!(
                "proposal {id} was already applied; removal is pending"
            )));
        }
        Ok(())
    }
}

impl<E: RegistryEndpoint> GovernanceProvider for DelegatedGovernance<E> {
    fn topology(&self) -> Topology {
        Topology::Delegated {
            registry: self.registry().clone(),
        }
    }

    // The record holds no signatory list, so it does not gate approvals;
    // `approve` below refuses them all.
    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::embedded(ApprovalPolicy::Unrestricted)
    }

    fn signatories(&self) -> Option<&BTreeSet<Address>> {
        None
    }

    fn propose(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        id: Option<ProposalId>,
    ) -> Result<ProposalId, GovernanceError> {
        let target = Some(self.instance.clone());
        let id = self
            .send(ctx, RegistryMessage::Propose { payload, id, target })?
            .into_proposal_id()?;
        info!(proposal_id = %id, registry = %self.registry(), "Delegated proposal created");
        Ok(id)
    }

    fn approve(&mut self, _ctx: &CallContext, _id: ProposalId) -> Result<(), GovernanceError> {
        Err(GovernanceError::Unsupported(format!(
            "approvals are collected by registry {}",
            self.registry()
        )))
    }

    fn is_threshold_met(&self, ctx: &CallContext, id: ProposalId) -> Result<bool, GovernanceError> {
        self.send(ctx, RegistryMessage::ThresholdMet { id })?
            .into_threshold_met()
    }

    fn approvals(&self, ctx: &CallContext, id: ProposalId) -> Result<BTreeSet<Address>, GovernanceError> {
        self.send(ctx, RegistryMessage::ProposalApprovals { id })?
            .into_approvals()
    }

    fn approved_payload(&self, ctx: &CallContext, id: ProposalId) -> Result<Payload, GovernanceError> {
        self.ensure_not_applied(id)?;
        let status = self
            .send(ctx, RegistryMessage::ProposalStatus { id })?
            .into_status()?;
        if status.target.as_ref() != Some(&self.instance) {
            return Err(GovernanceError::InvalidProposal(format!(
                "proposal {id} is not aimed at {}",
                self.instance
            )));
        }
        status.ensure_met()?;
        self.send(ctx, RegistryMessage::ProposalPayload { id })?
            .into_payload()
    }

    fn settle(
        &mut self,
        ctx: &CallContext,
        id: ProposalId,
        payload: &Payload,
    ) -> Result<Settlement, GovernanceError> {
        let removal = self
            .send(ctx, RegistryMessage::RemoveProposal { id })
            .and_then(|reply| reply.into_done());

        match (removal, self.removal_mode) {
            (Ok(()), _) => Ok(Settlement::Settled),
            (Err(err), RemovalMode::Atomic) => Err(err),
            (Err(err), RemovalMode::Deferred) => {
                warn!(
                    proposal_id = %id,
                    registry = %self.registry(),
                    error = %err,
                    "Registry refused removal; committing with removal pending"
                );
                self.pending.insert(
                    id,
                    PendingRemoval {
                        id,
                        payload_hash: fingerprint(payload),
                        since: ctx.now,
                        attempts: 1,
                        last_error: err.to_string(),
                    },
                );
                Ok(Settlement::RemovalPending)
            }
        }
    }

    fn withdraw(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), GovernanceError> {
        self.send(ctx, RegistryMessage::RemoveProposal { id })?
            .into_done()
    }

    fn pending_removals(&self) -> Vec<ProposalId> {
        self.pending.keys().copied().collect()
    }
}

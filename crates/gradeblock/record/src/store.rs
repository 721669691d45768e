use gradeblock_governance::{GovernanceError, Operation, Principals, RegistryEndpoint};
use gradeblock_integrity::{fingerprint, Digest};
use gradeblock_types::{Address, CallContext, Payload, ProposalId};
use tracing::{info, warn};

use crate::delegated::{DelegatedGovernance, RetryReport};
use crate::error::RecordError;
use crate::provider::{GovernanceProvider, Settlement};
use crate::record::{Record, RecordView};

/// Academic record gated by a [`GovernanceProvider`].
///
/// Mutations follow one shape: authorize → validate → fetch the approved
/// payload → settle the proposal → commit. Nothing is written before the
/// final step, so any failure leaves the store unchanged.
#[derive(Clone, Debug)]
pub struct RecordStore<G> {
    record: Record,
    governance: G,
}

impl<G: GovernanceProvider> RecordStore<G> {
    /// Create a record owned by `owner`. The creation time is the call time.
    pub fn create(
        ctx: &CallContext,
        owner: Address,
        subject: impl Into<String>,
        details: Payload,
        governance: G,
    ) -> Result<Self, RecordError> {
        if owner.is_null() {
            return Err(RecordError::InvalidInput("owner address is null".into()));
        }
        if details.is_empty() {
            return Err(RecordError::InvalidInput("record details are empty".into()));
        }
        let record = Record::new(subject.into(), owner, details, ctx.now);
        info!(
            owner = %record.owner(),
            subject = record.subject(),
            hash = %record.hash(),
            "Record created"
        );
        Ok(Self { record, governance })
    }

    /// Rebuild a store from persisted state. The stored hash is taken as
    /// is; call [`RecordStore::verify_record`] to check it.
    pub fn from_parts(record: Record, governance: G) -> Self {
        Self { record, governance }
    }

    fn authorize(&self, operation: Operation, caller: &Address) -> Result<(), GovernanceError> {
        let principals = Principals {
            owner: Some(self.record.owner()),
            signatories: self.governance.signatories(),
            consumers: None,
        };
        self.governance
            .access_policy()
            .authorize(operation, caller, &principals)
    }

    /// Owner-only: open a proposal carrying new record details.
    pub fn propose(
        &mut self,
        ctx: &CallContext,
        payload: Payload,
        id: Option<ProposalId>,
    ) -> Result<ProposalId, RecordError> {
        self.authorize(Operation::Propose, &ctx.sender)?;
        if payload.is_empty() {
            return Err(RecordError::InvalidInput("proposed details are empty".into()));
        }
        Ok(self.governance.propose(ctx, payload, id)?)
    }

    /// Owner-only: open a proposal to hand the record to `new_owner`.
    pub fn propose_ownership_transfer(
        &mut self,
        ctx: &CallContext,
        new_owner: &Address,
        id: Option<ProposalId>,
    ) -> Result<ProposalId, RecordError> {
        self.authorize(Operation::Propose, &ctx.sender)?;
        if new_owner.is_null() {
            return Err(RecordError::InvalidInput("new owner address is null".into()));
        }
        let payload = Payload::for_owner(new_owner)?;
        Ok(self.governance.propose(ctx, payload, id)?)
    }

    pub fn approve(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), RecordError> {
        self.authorize(Operation::Approve, &ctx.sender)?;
        Ok(self.governance.approve(ctx, id)?)
    }

    pub fn is_threshold_met(&self, ctx: &CallContext, id: ProposalId) -> Result<bool, RecordError> {
        Ok(self.governance.is_threshold_met(ctx, id)?)
    }

    /// Owner-only: replace the details with `new_details`, which must be
    /// exactly the payload of approved proposal `id`.
    pub fn update_record(
        &mut self,
        ctx: &CallContext,
        new_details: Payload,
        id: ProposalId,
    ) -> Result<Settlement, RecordError> {
        self.authorize(Operation::UpdateRecord, &ctx.sender)?;
        let new_hash = self.check_new_details(&new_details)?;

        let approved = self.governance.approved_payload(ctx, id)?;
        if approved != new_details {
            return Err(GovernanceError::InvalidProposal(format!(
                "details do not match proposal {id}"
            ))
            .into());
        }

        let settlement = self.governance.settle(ctx, id, &new_details)?;
        self.commit_details(ctx, new_details, new_hash, id, settlement);
        Ok(settlement)
    }

    /// Apply the payload of approved proposal `id` as the new details.
    /// Anyone may trigger this once the threshold is met.
    pub fn execute_update(&mut self, ctx: &CallContext, id: ProposalId) -> Result<Settlement, RecordError> {
        self.authorize(Operation::Execute, &ctx.sender)?;
        let new_details = self.governance.approved_payload(ctx, id)?;
        let new_hash = self.check_new_details(&new_details)?;

        let settlement = self.governance.settle(ctx, id, &new_details)?;
        self.commit_details(ctx, new_details, new_hash, id, settlement);
        Ok(settlement)
    }

    /// Read the details. Allowed to the owner and to any address that
    /// approved proposal `id`.
    pub fn retrieve_record(&self, ctx: &CallContext, id: ProposalId) -> Result<&Payload, RecordError> {
        if &ctx.sender == self.record.owner() {
            return Ok(self.record.details());
        }
        let approvals = match self.governance.approvals(ctx, id) {
            Ok(approvals) => approvals,
            Err(GovernanceError::ProposalNotFound(_)) => {
                return Err(RecordError::AccessDenied(ctx.sender.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        if !approvals.contains(&ctx.sender) {
            return Err(RecordError::AccessDenied(ctx.sender.clone()));
        }
        Ok(self.record.details())
    }

    /// Recompute the fingerprint of the current details and compare it with
    /// the stored one.
    pub fn verify_record(&self) -> Result<Digest, RecordError> {
        let computed = fingerprint(self.record.details());
        let stored = self.record.hash();
        if computed != stored {
            warn!(
                subject = self.record.subject(),
                %stored,
                %computed,
                "Record integrity check failed"
            );
            return Err(RecordError::IntegrityCheckFailed { stored, computed });
        }
        Ok(stored)
    }

    /// Owner-only: transfer the record to `new_owner` under approved
    /// proposal `id`, whose payload must name `new_owner`. Resets both
    /// timestamps.
    pub fn change_ownership(
        &mut self,
        ctx: &CallContext,
        new_owner: Address,
        id: ProposalId,
    ) -> Result<Settlement, RecordError> {
        self.authorize(Operation::TransferOwnership, &ctx.sender)?;
        if new_owner.is_null() {
            return Err(RecordError::InvalidInput("new owner address is null".into()));
        }

        let approved = self.governance.approved_payload(ctx, id)?;
        if approved.as_owner().as_ref() != Some(&new_owner) {
            return Err(GovernanceError::InvalidProposal(format!(
                "proposal {id} does not transfer ownership to {new_owner}"
            ))
            .into());
        }

        let settlement = self.governance.settle(ctx, id, &approved)?;
        let previous = self.record.owner().clone();
        self.record.commit_owner(new_owner, ctx.now);
        info!(
            proposal_id = %id,
            from = %previous,
            to = %self.record.owner(),
            ?settlement,
            "Record ownership transferred"
        );
        Ok(settlement)
    }

    /// Owner-only: drop a pending proposal without applying it.
    pub fn withdraw_proposal(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), RecordError> {
        self.authorize(Operation::Withdraw, &ctx.sender)?;
        Ok(self.governance.withdraw(ctx, id)?)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn governance(&self) -> &G {
        &self.governance
    }

    pub fn view(&self) -> RecordView {
        RecordView {
            subject: self.record.subject().to_string(),
            owner: self.record.owner().clone(),
            hash: self.record.hash(),
            details_len: self.record.details().len(),
            created_at: self.record.created_at(),
            updated_at: self.record.updated_at(),
            topology: self.governance.topology(),
            pending_removals: self.governance.pending_removals(),
        }
    }

    fn check_new_details(&self, details: &Payload) -> Result<Digest, RecordError> {
        if details.is_empty() {
            return Err(RecordError::InvalidInput("new details are empty".into()));
        }
        let new_hash = fingerprint(details);
        if new_hash == self.record.hash() {
            return Err(RecordError::NoChangeDetected);
        }
        Ok(new_hash)
    }

    fn commit_details(
        &mut self,
        ctx: &CallContext,
        details: Payload,
        hash: Digest,
        id: ProposalId,
        settlement: Settlement,
    ) {
        self.record.commit_details(details, hash, ctx.now);
        info!(
            proposal_id = %id,
            caller = %ctx.sender,
            hash = %hash,
            ?settlement,
            "Record updated"
        );
    }
}

impl<E: RegistryEndpoint> RecordStore<DelegatedGovernance<E>> {
    /// Apply the payload of a proposal approved in the external registry.
    pub fn execute_approved_update(
        &mut self,
        ctx: &CallContext,
        id: ProposalId,
    ) -> Result<Settlement, RecordError> {
        self.execute_update(ctx, id)
    }

    /// Re-send outstanding registry removals.
    pub fn retry_pending_removals(&mut self, ctx: &CallContext) -> RetryReport {
        self.governance.retry_pending_removals(ctx)
    }
}

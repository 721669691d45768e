use gradeblock_governance::{RegistryMessage, RegistryReply};
use gradeblock_integrity::Digest;
use gradeblock_record::{RetryReport, Settlement};
use gradeblock_types::{Address, Payload, ProposalId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A call submitted by `sender` to the instance at `target`.
///
/// The sender is the authenticated identity; the ledger never reads an
/// identity from the call arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub sender: Address,
    pub target: Address,
    pub call: Call,
}

impl Transaction {
    pub fn new(sender: impl Into<Address>, target: impl Into<Address>, call: impl Into<Call>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            target: target.into(),
            call: call.into(),
        }
    }
}

/// Entry point invoked by a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instance", rename_all = "snake_case")]
pub enum Call {
    Multisig { message: RegistryMessage },
    Record { call: RecordCall },
}

impl Call {
    pub fn entrypoint(&self) -> &'static str {
        match self {
            Call::Multisig { message } => message.name(),
            Call::Record { call } => call.name(),
        }
    }
}

impl From<RegistryMessage> for Call {
    fn from(message: RegistryMessage) -> Self {
        Call::Multisig { message }
    }
}

impl From<RecordCall> for Call {
    fn from(call: RecordCall) -> Self {
        Call::Record { call }
    }
}

/// Record entry points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entrypoint", rename_all = "snake_case")]
pub enum RecordCall {
    Propose { payload: Payload, id: Option<ProposalId> },
    ProposeOwnershipTransfer { new_owner: Address, id: Option<ProposalId> },
    Approve { id: ProposalId },
    UpdateRecord { details: Payload, id: ProposalId },
    ExecuteUpdate { id: ProposalId },
    RetrieveRecord { id: ProposalId },
    VerifyRecord,
    ChangeOwnership { new_owner: Address, id: ProposalId },
    WithdrawProposal { id: ProposalId },
    RetryPendingRemovals,
}

impl RecordCall {
    pub fn name(&self) -> &'static str {
        match self {
            RecordCall::Propose { .. } => "propose",
            RecordCall::ProposeOwnershipTransfer { .. } => "propose_ownership_transfer",
            RecordCall::Approve { .. } => "approve",
            RecordCall::UpdateRecord { .. } => "update_record",
            RecordCall::ExecuteUpdate { .. } => "execute_update",
            RecordCall::RetrieveRecord { .. } => "retrieve_record",
            RecordCall::VerifyRecord => "verify_record",
            RecordCall::ChangeOwnership { .. } => "change_ownership",
            RecordCall::WithdrawProposal { .. } => "withdraw_proposal",
            RecordCall::RetryPendingRemovals => "retry_pending_removals",
        }
    }
}

/// Value produced by a successful transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Registry(RegistryReply),
    Proposed(ProposalId),
    Approved,
    Applied(Settlement),
    Withdrawn,
    Details(Payload),
    Verified(Digest),
    Retried(RetryReport),
}

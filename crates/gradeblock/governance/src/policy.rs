use std::collections::BTreeSet;
use std::fmt;

use gradeblock_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Operations subject to access control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Propose,
    Approve,
    Execute,
    Withdraw,
    ReadRecord,
    UpdateRecord,
    TransferOwnership,
    ManageSignatories,
    ChangeThreshold,
    ManageConsumers,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Propose => "propose",
            Self::Approve => "approve",
            Self::Execute => "execute",
            Self::Withdraw => "withdraw",
            Self::ReadRecord => "read record",
            Self::UpdateRecord => "update record",
            Self::TransferOwnership => "transfer ownership",
            Self::ManageSignatories => "manage signatories",
            Self::ChangeThreshold => "change threshold",
            Self::ManageConsumers => "manage consumers",
        };
        f.write_str(name)
    }
}

/// Who may register an approval.
///
/// `Unrestricted` keeps the legacy behaviour of the embedded record
/// registry, where any address could co-sign. It must be chosen
/// explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPolicy {
    #[default]
    SignatoriesOnly,
    Unrestricted,
}

/// Who may create (and withdraw) proposals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposerRule {
    /// Only the record owner (embedded governance).
    OwnerOnly,
    /// Signatories and authorized consumer instances (standalone multisig).
    SignatoriesAndConsumers,
}

/// The identities an authorization decision is evaluated against.
#[derive(Clone, Copy, Debug, Default)]
pub struct Principals<'a> {
    pub owner: Option<&'a Address>,
    pub signatories: Option<&'a BTreeSet<Address>>,
    pub consumers: Option<&'a BTreeSet<Address>>,
}

impl<'a> Principals<'a> {
    fn is_owner(&self, caller: &Address) -> bool {
        self.owner.is_some_and(|owner| owner == caller)
    }

    fn is_signatory(&self, caller: &Address) -> bool {
        self.signatories.is_some_and(|set| set.contains(caller))
    }

    fn is_consumer(&self, caller: &Address) -> bool {
        self.consumers.is_some_and(|set| set.contains(caller))
    }
}

/// Per-operation authorization table.
///
/// | Operation | Authorized |
/// |---|---|
/// | propose, withdraw | per [`ProposerRule`] |
/// | approve | per [`ApprovalPolicy`] |
/// | execute | anyone (threshold-gated elsewhere) |
/// | read record | owner, or an approver of the named proposal |
/// | update record, transfer ownership | owner |
/// | signatories, threshold, consumers | signatories |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub proposers: ProposerRule,
    pub approvers: ApprovalPolicy,
}

impl AccessPolicy {
    /// Policy of a record that embeds its own registry.
    pub fn embedded(approvers: ApprovalPolicy) -> Self {
        Self {
            proposers: ProposerRule::OwnerOnly,
            approvers,
        }
    }

    /// Policy of the standalone multisig.
    pub fn standalone() -> Self {
        Self {
            proposers: ProposerRule::SignatoriesAndConsumers,
            approvers: ApprovalPolicy::SignatoriesOnly,
        }
    }

    /// Whether `caller` may perform `operation`.
    ///
    /// `ReadRecord` is not decided here; see [`AccessPolicy::may_read`].
    pub fn permits(&self, operation: Operation, caller: &Address, who: &Principals<'_>) -> bool {
        match operation {
            Operation::Propose | Operation::Withdraw => match self.proposers {
                ProposerRule::OwnerOnly => who.is_owner(caller),
                ProposerRule::SignatoriesAndConsumers => {
                    who.is_signatory(caller) || who.is_consumer(caller)
                }
            },
            Operation::Approve => match self.approvers {
                ApprovalPolicy::SignatoriesOnly => who.is_signatory(caller),
                ApprovalPolicy::Unrestricted => true,
            },
            Operation::Execute => true,
            Operation::ReadRecord | Operation::UpdateRecord | Operation::TransferOwnership => {
                who.is_owner(caller)
            }
            Operation::ManageSignatories
            | Operation::ChangeThreshold
            | Operation::ManageConsumers => who.is_signatory(caller),
        }
    }

    /// Fail with `Unauthorized` unless [`AccessPolicy::permits`] holds.
    pub fn authorize(
        &self,
        operation: Operation,
        caller: &Address,
        who: &Principals<'_>,
    ) -> Result<(), GovernanceError> {
        if self.permits(operation, caller, who) {
            Ok(())
        } else {
            Err(GovernanceError::unauthorized(caller, operation))
        }
    }

    /// Read access: the owner, or an address that approved the named
    /// proposal.
    pub fn may_read(
        caller: &Address,
        owner: &Address,
        approvals: Option<&BTreeSet<Address>>,
    ) -> bool {
        caller == owner || approvals.is_some_and(|set| set.contains(caller))
    }
}

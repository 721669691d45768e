use std::collections::BTreeSet;

use gradeblock_types::Address;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GovernanceError;
use crate::policy::ApprovalPolicy;

/// Signatory membership plus the approval threshold.
///
/// Invariant: `0 < threshold <= members.len()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatorySet {
    members: BTreeSet<Address>,
    threshold: usize,
}

impl SignatorySet {
    pub fn new(
        members: impl IntoIterator<Item = Address>,
        threshold: usize,
    ) -> Result<Self, GovernanceError> {
        let members: BTreeSet<Address> = members.into_iter().collect();
        if let Some(null) = members.iter().find(|m| m.is_null()) {
            return Err(GovernanceError::InvalidInput(format!(
                "null signatory address {null:?}"
            )));
        }
        check_threshold(threshold, members.len())?;
        Ok(Self { members, threshold })
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    pub fn members(&self) -> &BTreeSet<Address> {
        &self.members
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn add(&mut self, address: Address) -> Result<bool, GovernanceError> {
        if address.is_null() {
            return Err(GovernanceError::InvalidInput(
                "null signatory address".into(),
            ));
        }
        let added = self.members.insert(address.clone());
        if added {
            info!(signatory = %address, members = self.members.len(), "Signatory added");
        }
        Ok(added)
    }

    /// Remove a member. Fails if the removal would leave fewer members than
    /// the threshold.
    pub fn remove(&mut self, address: &Address) -> Result<(), GovernanceError> {
        if !self.members.contains(address) {
            return Err(GovernanceError::InvalidInput(format!(
                "{address} is not a signatory"
            )));
        }
        check_threshold(self.threshold, self.members.len() - 1)?;
        self.members.remove(address);
        info!(signatory = %address, members = self.members.len(), "Signatory removed");
        Ok(())
    }

    pub fn change_threshold(&mut self, threshold: usize) -> Result<(), GovernanceError> {
        check_threshold(threshold, self.members.len())?;
        info!(from = self.threshold, to = threshold, "Threshold changed");
        self.threshold = threshold;
        Ok(())
    }
}

fn check_threshold(threshold: usize, signatories: usize) -> Result<(), GovernanceError> {
    if threshold == 0 || threshold > signatories {
        return Err(GovernanceError::InvalidThreshold {
            threshold,
            signatories,
        });
    }
    Ok(())
}

/// Declarative governance settings, as found in deployment config files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    pub threshold: usize,
    #[serde(default)]
    pub signatories: Vec<Address>,
    #[serde(default)]
    pub approval_policy: ApprovalPolicy,
}

impl GovernanceConfig {
    pub fn signatory_set(&self) -> Result<SignatorySet, GovernanceError> {
        SignatorySet::new(self.signatories.iter().cloned(), self.threshold)
    }
}

use chrono::{DateTime, Utc};
use gradeblock_integrity::{fingerprint, Digest};
use gradeblock_types::{Address, Payload};
use serde::{Deserialize, Serialize};

/// Persisted record state.
///
/// Invariant: after every committed change `hash == fingerprint(details)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub(crate) subject: String,
    pub(crate) owner: Address,
    pub(crate) details: Payload,
    pub(crate) hash: Digest,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl Record {
    pub(crate) fn new(subject: String, owner: Address, details: Payload, now: DateTime<Utc>) -> Self {
        let hash = fingerprint(&details);
        Self {
            subject,
            owner,
            details,
            hash,
            created_at: now,
            updated_at: None,
        }
    }

    /// Student identifier; fixed at creation and not part of the
    /// fingerprinted details.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn details(&self) -> &Payload {
        &self.details
    }

    pub fn hash(&self) -> Digest {
        self.hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub(crate) fn commit_details(&mut self, details: Payload, hash: Digest, now: DateTime<Utc>) {
        self.details = details;
        self.hash = hash;
        self.updated_at = Some(now);
    }

    pub(crate) fn commit_owner(&mut self, owner: Address, now: DateTime<Utc>) {
        self.owner = owner;
        self.created_at = now;
        self.updated_at = Some(now);
    }
}

/// Public metadata of a record. Details are omitted; reading them is
/// access-controlled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub subject: String,
    pub owner: Address,
    pub hash: Digest,
    pub details_len: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub topology: crate::provider::Topology,
    pub pending_removals: Vec<gradeblock_types::ProposalId>,
}

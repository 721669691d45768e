use chrono::{DateTime, Utc};
use gradeblock_governance::ErrorKind;
use gradeblock_integrity::Digest;
use gradeblock_types::Address;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain tag for receipt hashes.
pub const RECEIPT_DOMAIN: &[u8] = b"gradeblock-receipt-v1:";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiptStatus {
    Committed,
    Failed {
        kind: Option<ErrorKind>,
        message: String,
    },
}

impl ReceiptStatus {
    pub fn is_committed(&self) -> bool {
        matches!(self, ReceiptStatus::Committed)
    }
}

/// Entry in the ledger's append-only log. `hash` covers `previous` and
/// every other field, so editing or dropping an entry breaks the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub sequence: u64,
    pub tx_id: Uuid,
    pub sender: Address,
    pub target: Address,
    pub entrypoint: String,
    pub at: DateTime<Utc>,
    pub status: ReceiptStatus,
    pub previous: Digest,
    pub hash: Digest,
}

#[derive(Serialize)]
struct ReceiptBody<'a> {
    sequence: u64,
    tx_id: &'a Uuid,
    sender: &'a Address,
    target: &'a Address,
    entrypoint: &'a str,
    at: &'a DateTime<Utc>,
    status: &'a ReceiptStatus,
}

impl Receipt {
    /// Hash of the (absent) receipt before sequence 0.
    pub fn genesis() -> Digest {
        Digest::from_bytes([0u8; 32])
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn seal(
        sequence: u64,
        tx_id: Uuid,
        sender: Address,
        target: Address,
        entrypoint: &str,
        at: DateTime<Utc>,
        status: ReceiptStatus,
        previous: Digest,
    ) -> Self {
        let mut receipt = Self {
            sequence,
            tx_id,
            sender,
            target,
            entrypoint: entrypoint.to_string(),
            at,
            status,
            previous,
            hash: previous,
        };
        receipt.hash = receipt.compute_hash();
        receipt
    }

    pub fn compute_hash(&self) -> Digest {
        let body = ReceiptBody {
            sequence: self.sequence,
            tx_id: &self.tx_id,
            sender: &self.sender,
            target: &self.target,
            entrypoint: &self.entrypoint,
            at: &self.at,
            status: &self.status,
        };
        let mut hasher = blake3::Hasher::new();
        hasher.update(RECEIPT_DOMAIN);
        hasher.update(self.previous.as_bytes());
        // Plain data with string keys; serialization does not fail.
        let bytes = serde_json::to_vec(&body).unwrap_or_default();
        hasher.update(&bytes);
        Digest::from_bytes(*hasher.finalize().as_bytes())
    }

    pub fn verify_integrity(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

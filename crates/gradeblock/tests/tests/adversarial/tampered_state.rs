//! Adversarial test: persisted state edited outside the governed paths is
//! detected, and the receipt log cannot be rewritten silently.

use gradeblock_governance::ErrorKind;
use gradeblock_integrity::Digest;
use gradeblock_ledger::RecordCall;
use gradeblock_record::{EmbeddedGovernance, Record, RecordError, RecordStore, RemovalMode};
use gradeblock_tests::*;
use gradeblock_types::Address;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round-trip a record through its persisted JSON form, editing it on the
/// way.
fn persist_and_edit(store: &RecordStore<EmbeddedGovernance>, edit: impl FnOnce(&mut serde_json::Value)) -> Record {
    let mut json = serde_json::to_value(store.record()).unwrap();
    edit(&mut json);
    serde_json::from_value(json).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn edited_details_fail_verification() {
    let store = embedded_record(&["A"], 1);
    let forged = transcript(&[("Everything", "A+")]);
    let record = persist_and_edit(&store, |json| {
        json["details"] = serde_json::to_value(&forged).unwrap();
    });

    let restored = RecordStore::from_parts(record, store.governance().clone());
    match restored.verify_record() {
        Err(RecordError::IntegrityCheckFailed { stored, computed }) => {
            assert_eq!(stored, store.record().hash());
            assert_ne!(stored, computed);
        }
        other => panic!("expected integrity failure, got {other:?}"),
    }
}

#[test]
fn edited_hash_fails_verification() {
    let store = embedded_record(&["A"], 1);
    let record = persist_and_edit(&store, |json| {
        json["hash"] = serde_json::Value::String(Digest::from_bytes([7; 32]).to_hex());
    });
    let restored = RecordStore::from_parts(record, store.governance().clone());
    assert_eq!(
        restored.verify_record().unwrap_err().kind(),
        ErrorKind::IntegrityCheckFailed
    );
}

#[test]
fn untouched_round_trip_verifies() {
    let store = embedded_record(&["A"], 1);
    let record = persist_and_edit(&store, |_| {});
    let restored = RecordStore::from_parts(record, store.governance().clone());
    assert_eq!(restored.verify_record().unwrap(), store.record().hash());
}

#[test]
fn malformed_hash_is_rejected_on_load() {
    let store = embedded_record(&["A"], 1);
    let mut json = serde_json::to_value(store.record()).unwrap();
    json["hash"] = serde_json::Value::String("not-hex".into());
    assert!(serde_json::from_value::<Record>(json).is_err());
}

#[test]
fn rewritten_receipt_breaks_the_chain() {
    let mut harness = Harness::new(RemovalMode::Atomic);
    harness
        .ledger
        .deploy_record(
            Address::new(RECORD),
            Address::new(OWNER),
            "S-1001",
            transcript(&[]),
            &governance_config(&["A"], 1),
        )
        .unwrap();
    for _ in 0..3 {
        harness.submit(OWNER, RECORD, RecordCall::VerifyRecord);
    }
    harness.ledger.verify_receipts().unwrap();

    let mut receipts = harness.ledger.receipts().to_vec();
    let original = receipts[1].hash;
    receipts[1].entrypoint = "change_ownership".into();
    assert!(!receipts[1].verify_integrity());

    // Resealing the edited entry still leaves its successor pointing at the
    // original hash.
    receipts[1].hash = receipts[1].compute_hash();
    assert!(receipts[1].verify_integrity());
    assert_ne!(receipts[2].previous, receipts[1].hash);
    assert_eq!(receipts[2].previous, original);
}

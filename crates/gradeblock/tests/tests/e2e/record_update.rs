//! E2E test: an embedded-governance record moves from D0 to D1 once its
//! signatories have approved, and only then.

use chrono::Duration;
use gradeblock_governance::ErrorKind;
use gradeblock_integrity::fingerprint;
use gradeblock_record::Settlement;
use gradeblock_tests::*;
use gradeblock_types::ProposalId;

#[test]
fn owner_updates_after_threshold() {
    let mut store = embedded_record(&["A", "B", "C"], 2);
    let d0 = store.record().details().clone();
    let hash0 = store.record().hash();
    assert_eq!(hash0, fingerprint(&d0));

    // Outsider without approval-set membership cannot read.
    let err = store.retrieve_record(&ctx("eve"), ProposalId(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let d1 = transcript(&[("Algorithms", "A"), ("Databases", "B+")]);
    let id = store.propose(&ctx(OWNER), d1.clone(), None).unwrap();
    store.approve(&ctx("A"), id).unwrap();

    // An approver of the named proposal may read the current details.
    assert_eq!(store.retrieve_record(&ctx("A"), id).unwrap(), &d0);

    let err = store.update_record(&ctx(OWNER), d1.clone(), id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientApprovals);

    store.approve(&ctx("C"), id).unwrap();
    let later = epoch() + Duration::days(1);
    let settlement = store
        .update_record(&ctx_at(OWNER, later), d1.clone(), id)
        .unwrap();

    assert_eq!(settlement, Settlement::Settled);
    assert_eq!(store.record().hash(), fingerprint(&d1));
    assert_eq!(store.record().updated_at(), Some(later));
    assert_eq!(store.record().created_at(), epoch());
    assert!(!store.governance().proposals().contains(id));
    assert_eq!(store.verify_record().unwrap(), fingerprint(&d1));
}

#[test]
fn unchanged_details_are_rejected_even_when_approved() {
    let mut store = embedded_record(&["A", "B"], 1);
    let same = store.record().details().clone();
    let id = store.propose(&ctx(OWNER), same.clone(), None).unwrap();
    store.approve(&ctx("A"), id).unwrap();

    let err = store.update_record(&ctx(OWNER), same, id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoChangeDetected);
    assert_eq!(store.record().updated_at(), None);
    assert!(store.governance().proposals().contains(id));
}

#[test]
fn semantically_equal_payloads_hash_identically() {
    let mut store = embedded_record(&["A"], 1);
    let current = serde_json::json!({ "courses": [] });
    let reencoded = gradeblock_types::Payload::encode(&current).unwrap();

    let id = store.propose(&ctx(OWNER), reencoded.clone(), None).unwrap();
    store.approve(&ctx("A"), id).unwrap();
    let err = store.update_record(&ctx(OWNER), reencoded, id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoChangeDetected);
}

#[test]
fn execute_update_applies_stored_payload() {
    let mut store = embedded_record(&["A", "B"], 2);
    let d1 = transcript(&[("Compilers", "A-")]);
    let id = store.propose(&ctx(OWNER), d1.clone(), None).unwrap();
    store.approve(&ctx("A"), id).unwrap();
    store.approve(&ctx("B"), id).unwrap();

    store.execute_update(&ctx("relayer"), id).unwrap();
    assert_eq!(store.record().details(), &d1);

    let err = store.execute_update(&ctx("relayer"), id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProposalNotFound);
}

#[test]
fn successive_updates_keep_integrity() {
    let mut store = embedded_record(&["A"], 1);
    for (step, grade) in ["C", "B", "A"].into_iter().enumerate() {
        let details = transcript(&[("Networks", grade)]);
        let id = store.propose(&ctx(OWNER), details.clone(), None).unwrap();
        store.approve(&ctx("A"), id).unwrap();
        let at = epoch() + Duration::hours(step as i64 + 1);
        store.update_record(&ctx_at(OWNER, at), details, id).unwrap();
        store.verify_record().unwrap();
        assert_eq!(store.record().updated_at(), Some(at));
    }
}

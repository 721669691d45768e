//! Adversarial test: two records delegate to one multisig. Neither may
//! apply or withdraw the other's proposals.

use gradeblock_governance::{ErrorKind, LocalEndpoint, SharedMultisig};
use gradeblock_integrity::fingerprint;
use gradeblock_record::{DelegatedGovernance, RecordStore, RemovalMode, Settlement};
use gradeblock_tests::*;
use gradeblock_types::ProposalId;

const OTHER_RECORD: &str = "KT1-record-2";
const OTHER_OWNER: &str = "tz1-other-registrar";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Delegated = RecordStore<DelegatedGovernance<LocalEndpoint>>;

fn two_records() -> (SharedMultisig, Delegated, Delegated) {
    let multisig = shared_multisig(&["A", "B"], 2);
    let x = delegated_record(&multisig, "A", RemovalMode::Atomic);
    let y = delegated_record_at(
        &multisig,
        "A",
        OTHER_RECORD,
        OTHER_OWNER,
        "S-2002",
        RemovalMode::Atomic,
    );
    (multisig, x, y)
}

fn approved_for_y(
    multisig: &SharedMultisig,
    y: &mut Delegated,
) -> ProposalId {
    let id = y
        .propose(&ctx(OTHER_OWNER), transcript(&[("Databases", "A")]), None)
        .unwrap();
    for signer in ["A", "B"] {
        multisig.lock().unwrap().approve(&ctx(signer), id).unwrap();
    }
    id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn record_cannot_apply_another_records_proposal() {
    let (multisig, mut x, mut y) = two_records();
    let id = approved_for_y(&multisig, &mut y);
    let before = x.view();

    let err = x.execute_approved_update(&ctx("eve"), id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidProposal);
    assert_eq!(x.view(), before);

    let d_y = transcript(&[("Databases", "A")]);
    let err = x.update_record(&ctx(OWNER), d_y.clone(), id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidProposal);
    assert!(multisig.lock().unwrap().proposal(id).is_ok());

    assert_eq!(
        y.execute_approved_update(&ctx("eve"), id).unwrap(),
        Settlement::Settled
    );
    assert_eq!(y.record().hash(), fingerprint(&d_y));
}

#[test]
fn record_cannot_withdraw_another_records_proposal() {
    let (multisig, mut x, mut y) = two_records();
    let id = approved_for_y(&multisig, &mut y);

    let err = x.withdraw_proposal(&ctx(OWNER), id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(multisig.lock().unwrap().proposal(id).is_ok());

    y.withdraw_proposal(&ctx(OTHER_OWNER), id).unwrap();
    assert!(multisig.lock().unwrap().proposals().is_empty());
}

#[test]
fn record_cannot_withdraw_signatory_proposals() {
    let (multisig, mut x, _y) = two_records();
    let id = multisig
        .lock()
        .unwrap()
        .propose(&ctx("A"), transcript(&[("membership", "add C")]), None)
        .unwrap();

    let err = x.withdraw_proposal(&ctx(OWNER), id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(multisig.lock().unwrap().proposal(id).is_ok());
}

//! Adversarial test: every privileged entry point refuses callers outside
//! its authorized set, and a refusal leaves state untouched.

use gradeblock_governance::{ErrorKind, Multisig, RegistryMessage};
use gradeblock_ledger::RecordCall;
use gradeblock_record::{EmbeddedGovernance, RecordStore, RemovalMode};
use gradeblock_tests::*;
use gradeblock_types::{Address, Payload, ProposalId};

// ---------------------------------------------------------------------------
// Tests: Embedded record
// ---------------------------------------------------------------------------

#[test]
fn non_owner_cannot_propose_update_or_transfer() {
    let mut store = embedded_record(&["A", "B"], 1);
    let d1 = transcript(&[("Forgery", "A+")]);

    for caller in ["A", "eve"] {
        assert_eq!(
            store.propose(&ctx(caller), d1.clone(), None).unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            store
                .propose_ownership_transfer(&ctx(caller), &Address::new(caller), None)
                .unwrap_err()
                .kind(),
            ErrorKind::Unauthorized
        );
    }

    let id = store.propose(&ctx(OWNER), d1.clone(), None).unwrap();
    store.approve(&ctx("A"), id).unwrap();

    assert_eq!(
        store.update_record(&ctx("A"), d1.clone(), id).unwrap_err().kind(),
        ErrorKind::Unauthorized
    );
    assert_eq!(
        store
            .change_ownership(&ctx("A"), Address::new("A"), id)
            .unwrap_err()
            .kind(),
        ErrorKind::Unauthorized
    );
    assert_eq!(
        store.withdraw_proposal(&ctx("A"), id).unwrap_err().kind(),
        ErrorKind::Unauthorized
    );
    assert!(store.governance().proposals().contains(id));
}

#[test]
fn outsiders_cannot_inflate_approvals() {
    let mut store = embedded_record(&["A", "B", "C"], 2);
    let id = store
        .propose(&ctx(OWNER), transcript(&[("Ethics", "A")]), None)
        .unwrap();

    for sybil in ["eve-1", "eve-2", "eve-3"] {
        let err = store.approve(&ctx(sybil), id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
    store.approve(&ctx("A"), id).unwrap();
    store.approve(&ctx("A"), id).unwrap();
    assert!(!store.is_threshold_met(&ctx(OWNER), id).unwrap());
}

#[test]
fn unrestricted_mode_accepts_any_cosigner() {
    let mut store = RecordStore::create(
        &ctx(OWNER),
        Address::new(OWNER),
        "S-1001",
        transcript(&[]),
        EmbeddedGovernance::unrestricted(2).unwrap(),
    )
    .unwrap();
    let d1 = transcript(&[("Art", "B")]);
    let id = store.propose(&ctx(OWNER), d1.clone(), None).unwrap();
    store.approve(&ctx("anyone-1"), id).unwrap();
    store.approve(&ctx("anyone-2"), id).unwrap();
    store.update_record(&ctx(OWNER), d1, id).unwrap();
}

#[test]
fn approving_a_missing_proposal_fails() {
    let mut store = embedded_record(&["A"], 1);
    let err = store.approve(&ctx("A"), ProposalId(9)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProposalNotFound);
}

// ---------------------------------------------------------------------------
// Tests: Standalone multisig
// ---------------------------------------------------------------------------

#[test]
fn outsiders_cannot_touch_the_multisig() {
    let mut multisig = Multisig::new(signatories(&["A", "B"], 2));
    let before = multisig.clone();
    let eve = ctx("eve");

    let attempts = [
        RegistryMessage::Propose { payload: Payload::from("P"), id: None, target: None },
        RegistryMessage::AddSignatory { address: Address::new("eve") },
        RegistryMessage::RemoveSignatory { address: Address::new("A") },
        RegistryMessage::ChangeThreshold { threshold: 1 },
        RegistryMessage::AuthorizeConsumer { address: Address::new("eve") },
    ];
    for message in attempts {
        let name = message.name();
        let err = multisig.handle(&eve, message).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized, "{name}");
    }
    assert_eq!(multisig, before);
}

#[test]
fn consumers_propose_but_never_vote() {
    let multisig = shared_multisig(&["A", "B"], 1);
    let _store = delegated_record(&multisig, "A", RemovalMode::Atomic);
    let mut guard = multisig.lock().unwrap();

    let as_record = ctx(RECORD);
    let id = guard.propose(&as_record, Payload::from("P"), None).unwrap();
    let err = guard.approve(&as_record, id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    let err = guard
        .add_signatory(&as_record, Address::new(RECORD))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

// ---------------------------------------------------------------------------
// Tests: Ledger identity
// ---------------------------------------------------------------------------

#[test]
fn ledger_uses_sender_not_arguments() {
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

    // Naming the owner as the new owner does not make eve the owner.
    let applied = harness.submit(
        "eve",
        RECORD,
        RecordCall::ProposeOwnershipTransfer { new_owner: Address::new(OWNER), id: None },
    );
    assert_eq!(
        applied.outcome.unwrap_err().kind(),
        Some(ErrorKind::Unauthorized)
    );
    assert_eq!(harness.ledger.receipts()[0].sender, Address::new("eve"));
}

//! Property tests: approvals are a set and the threshold is a pure count.

use std::collections::BTreeSet;

use gradeblock_governance::{ErrorKind, Multisig};
use gradeblock_tests::*;
use gradeblock_types::Payload;
use proptest::prelude::*;

const MEMBERS: [&str; 5] = ["A", "B", "C", "D", "E"];

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A threshold and a sequence of approvers (with repeats) drawn from the
/// five members.
fn arb_round() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..=5, prop::collection::vec(0usize..5, 0..20))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn repeated_approval_is_idempotent(approver in 0usize..5, repeats in 1usize..6) {
        let mut multisig = Multisig::new(signatories(&MEMBERS, 5));
        let id = multisig.propose(&ctx("A"), Payload::from("P"), None).unwrap();
        for _ in 0..repeats {
            multisig.approve(&ctx(MEMBERS[approver]), id).unwrap();
        }
        prop_assert_eq!(multisig.status(id).unwrap().approvals, 1);
    }

    #[test]
    fn execute_succeeds_exactly_at_threshold((threshold, approvers) in arb_round()) {
        let mut multisig = Multisig::new(signatories(&MEMBERS, threshold));
        let id = multisig.propose(&ctx("A"), Payload::from("P"), None).unwrap();
        let mut distinct = BTreeSet::new();
        for index in approvers {
            multisig.approve(&ctx(MEMBERS[index]), id).unwrap();
            distinct.insert(index);
        }

        prop_assert_eq!(multisig.is_threshold_met(id).unwrap(), distinct.len() >= threshold);
        match multisig.execute(&ctx("anyone"), id) {
            Ok(payload) => {
                prop_assert!(distinct.len() >= threshold);
                prop_assert_eq!(payload, Payload::from("P"));
                prop_assert_eq!(
                    multisig.execute(&ctx("anyone"), id).unwrap_err().kind(),
                    ErrorKind::ProposalNotFound
                );
            }
            Err(err) => {
                prop_assert!(distinct.len() < threshold);
                prop_assert_eq!(err.kind(), ErrorKind::InsufficientApprovals);
                prop_assert!(multisig.proposal(id).is_ok());
            }
        }
    }

    #[test]
    fn approval_order_does_not_matter(order in Just(vec![0usize, 1, 2]).prop_shuffle()) {
        let mut multisig = Multisig::new(signatories(&MEMBERS, 3));
        let id = multisig.propose(&ctx("A"), Payload::from("P"), None).unwrap();
        for index in order {
            multisig.approve(&ctx(MEMBERS[index]), id).unwrap();
        }
        prop_assert!(multisig.is_threshold_met(id).unwrap());
    }

    #[test]
    fn threshold_outside_bounds_is_rejected(threshold in prop_oneof![Just(0usize), 6usize..50]) {
        let mut multisig = Multisig::new(signatories(&MEMBERS, 3));
        prop_assert_eq!(
            multisig.change_threshold(&ctx("A"), threshold).unwrap_err().kind(),
            ErrorKind::InvalidThreshold
        );
        prop_assert_eq!(multisig.threshold(), 3);
    }
}

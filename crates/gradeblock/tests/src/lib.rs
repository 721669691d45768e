//! Shared fixtures for the GradeBlock end-to-end, property and adversarial
//! suites.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use gradeblock_governance::{GovernanceConfig, LocalEndpoint, Multisig, SharedMultisig, SignatorySet};
use gradeblock_ledger::{Applied, Call, Ledger, Transaction};
use gradeblock_record::{DelegatedGovernance, EmbeddedGovernance, RecordStore, RemovalMode};
use gradeblock_types::{Address, CallContext, Clock, ManualClock, Payload};
use serde_json::json;

pub const OWNER: &str = "tz1-registrar";
pub const STUDENT: &str = "tz1-student";
pub const MULTISIG: &str = "KT1-multisig";
pub const RECORD: &str = "KT1-record";

/// Fixed starting instant for every suite.
pub fn epoch() -> DateTime<Utc> {
    ManualClock::epoch().now()
}

pub fn ctx(sender: &str) -> CallContext {
    CallContext::new(sender, epoch())
}

pub fn ctx_at(sender: &str, now: DateTime<Utc>) -> CallContext {
    CallContext::new(sender, now)
}

pub fn addresses(names: &[&str]) -> Vec<Address> {
    names.iter().map(|name| Address::new(*name)).collect()
}

pub fn signatories(names: &[&str], threshold: usize) -> SignatorySet {
    SignatorySet::new(addresses(names), threshold).expect("valid signatory set")
}

pub fn governance_config(names: &[&str], threshold: usize) -> GovernanceConfig {
    GovernanceConfig {
        threshold,
        signatories: addresses(names),
        approval_policy: Default::default(),
    }
}

/// Canonical transcript payload: `[(course, grade), ...]`.
pub fn transcript(courses: &[(&str, &str)]) -> Payload {
    let courses: Vec<_> = courses
        .iter()
        .map(|(name, grade)| json!({ "course": name, "grade": grade }))
        .collect();
    Payload::encode(&json!({ "courses": courses })).expect("transcript encodes")
}

/// Embedded record owned by [`OWNER`], approvals restricted to `names`.
pub fn embedded_record(names: &[&str], threshold: usize) -> RecordStore<EmbeddedGovernance> {
    RecordStore::create(
        &ctx(OWNER),
        Address::new(OWNER),
        "S-1001",
        transcript(&[]),
        EmbeddedGovernance::with_signatories(signatories(names, threshold)),
    )
    .expect("record deploys")
}

pub fn shared_multisig(names: &[&str], threshold: usize) -> SharedMultisig {
    Arc::new(Mutex::new(Multisig::new(signatories(names, threshold))))
}

/// Delegated record at [`RECORD`] wired to `multisig`, already authorized
/// as a consumer by `admin`.
pub fn delegated_record(
    multisig: &SharedMultisig,
    admin: &str,
    mode: RemovalMode,
) -> RecordStore<DelegatedGovernance<LocalEndpoint>> {
    delegated_record_at(multisig, admin, RECORD, OWNER, "S-1001", mode)
}

/// Delegated record for `subject` deployed at `instance` and owned by
/// `owner`, authorized as a consumer of `multisig` by `admin`.
pub fn delegated_record_at(
    multisig: &SharedMultisig,
    admin: &str,
    instance: &str,
    owner: &str,
    subject: &str,
    mode: RemovalMode,
) -> RecordStore<DelegatedGovernance<LocalEndpoint>> {
    multisig
        .lock()
        .expect("multisig lock")
        .authorize_consumer(&ctx(admin), Address::new(instance))
        .expect("consumer authorized");
    let endpoint = LocalEndpoint::new(Address::new(MULTISIG), Arc::clone(multisig));
    RecordStore::create(
        &ctx(owner),
        Address::new(owner),
        subject,
        transcript(&[]),
        DelegatedGovernance::new(Address::new(instance), endpoint).with_removal_mode(mode),
    )
    .expect("record deploys")
}

/// Ledger driven by a manual clock.
pub struct Harness {
    pub clock: ManualClock,
    pub ledger: Ledger,
}

impl Harness {
    pub fn new(mode: RemovalMode) -> Self {
        let clock = ManualClock::epoch();
        let ledger = Ledger::new(Arc::new(clock.clone())).with_removal_mode(mode);
        Self { clock, ledger }
    }

    pub fn submit(&mut self, sender: &str, target: &str, call: impl Into<Call>) -> Applied {
        self.ledger.apply(Transaction::new(sender, target, call))
    }
}

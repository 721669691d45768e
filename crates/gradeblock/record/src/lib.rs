//! # gradeblock-record
//!
//! The academic record store. A [`RecordStore`] owns the current record
//! details, their fingerprint, the owner identity, and the creation/update
//! timestamps, and only mutates them once governance has cleared the
//! change.
//!
//! Governance is supplied through the [`GovernanceProvider`] trait, fixed
//! at construction:
//!
//! - [`EmbeddedGovernance`]: the record carries its own proposal registry
//! - [`DelegatedGovernance`]: the record references an external
//!   [`Multisig`](gradeblock_governance::Multisig) and reaches it through a
//!   [`RegistryEndpoint`](gradeblock_governance::RegistryEndpoint)
//!
//! Every mutating operation validates first and commits last, so a failed
//! call leaves the record as it was.

#![deny(unsafe_code)]

pub mod delegated;
pub mod embedded;
pub mod error;
pub mod provider;
pub mod record;
pub mod store;

pub use delegated::{DelegatedGovernance, PendingRemoval, RemovalMode, RetryReport};
pub use embedded::EmbeddedGovernance;
pub use error::RecordError;
pub use provider::{GovernanceProvider, Settlement, Topology};
pub use record::{Record, RecordView};
pub use store::RecordStore;

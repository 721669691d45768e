//! # gradeblock-governance
//!
//! Proposal-based threshold governance.
//!
//! ## Core Components
//!
//! - **ProposalRegistry**: proposal lifecycle (propose, approve, execute,
//!   remove) with monotonic id allocation and set-semantics approvals
//! - **AccessPolicy**: per-operation authorization table
//! - **SignatorySet**: membership and threshold bounds
//! - **Multisig**: the standalone, independently addressable governance
//!   unit, reachable through [`RegistryMessage`]s
//!
//! Threshold evaluation is a plain count comparison: a proposal may execute
//! once `|approvals| >= threshold`. Approving twice from the same address
//! changes nothing.

#![deny(unsafe_code)]

pub mod error;
pub mod message;
pub mod multisig;
pub mod policy;
pub mod proposal;
pub mod signatories;

pub use error::{ErrorKind, GovernanceError};
pub use message::{
    LocalEndpoint, ProposalStatus, RegistryEndpoint, RegistryMessage, RegistryReply,
    SharedMultisig,
};
pub use multisig::Multisig;
pub use policy::{AccessPolicy, ApprovalPolicy, Operation, Principals, ProposerRule};
pub use proposal::{Proposal, ProposalRegistry};
pub use signatories::{GovernanceConfig, SignatorySet};

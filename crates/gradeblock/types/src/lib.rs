//! # gradeblock-types
//!
//! Vocabulary shared by every GradeBlock crate:
//!
//! - [`Address`]: opaque caller/account identity
//! - [`ProposalId`]: natural-number key of a pending change
//! - [`Payload`]: opaque byte blob carried by proposals and records
//! - [`CallContext`]: authenticated sender and transaction time, supplied
//!   by the execution host for every entry-point invocation
//! - [`Clock`]: injectable time source ([`SystemClock`], [`ManualClock`])

#![deny(unsafe_code)]

pub mod address;
pub mod clock;
pub mod context;
pub mod payload;

pub use address::{Address, ProposalId};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::CallContext;
pub use payload::{Payload, PayloadError};

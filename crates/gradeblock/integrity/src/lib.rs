//! # gradeblock-integrity
//!
//! Deterministic fingerprints for tamper detection. A [`Digest`] is the
//! BLAKE3 hash of a payload's canonical bytes under a fixed domain tag, so
//! record fingerprints can never be confused with hashes computed for any
//! other purpose.

#![deny(unsafe_code)]

mod digest;

pub use digest::{fingerprint, fingerprint_value, Digest, IntegrityError, FINGERPRINT_DOMAIN};

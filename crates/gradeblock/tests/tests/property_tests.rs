#[path = "property/fingerprint_determinism.rs"]
mod fingerprint_determinism;

#[path = "property/approval_threshold.rs"]
mod approval_threshold;

#[path = "property/record_integrity.rs"]
mod record_integrity;

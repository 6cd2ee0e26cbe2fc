//! The D7 boundary guard: claim-kind entries may never carry a raw numeric
//! confidence, in the typed field or nested inside the payload.

use librarian_core::confidence::ensure_typed_confidence;
use librarian_core::errors::{LibrarianError, LibrarianResult};
use librarian_core::models::{EvidenceKind, NewEvidence};

/// Payload keys that are expected to hold confidence objects when present.
const NESTED_CONFIDENCE_KEYS: &[&str] = &["confidence", "stated_confidence"];

/// Check a claim-kind entry before it is appended. Non-claim kinds skip the
/// check entirely.
pub fn check_new_entry(entry: &NewEvidence) -> LibrarianResult<()> {
    if entry.kind != EvidenceKind::Claim {
        return Ok(());
    }
    if entry.confidence.is_none() {
        return Err(LibrarianError::d7_violation(
            "ledger.append",
            "claim entry has no typed confidence",
        ));
    }
    check_payload(&entry.payload, "ledger.append")
}

/// Re-check a stored payload on read. The typed field is already enforced by
/// the type system; the payload is the dynamic surface.
pub fn check_payload(payload: &serde_json::Value, boundary: &str) -> LibrarianResult<()> {
    let Some(object) = payload.as_object() else {
        return Ok(());
    };
    for key in NESTED_CONFIDENCE_KEYS {
        if let Some(value) = object.get(*key) {
            ensure_typed_confidence(value, boundary)?;
        }
    }
    Ok(())
}

//! Tests for the in-memory claim/defeater/contradiction store.

use chrono::Utc;
use librarian_core::confidence::{BoundsBasis, ConfidenceValue};
use librarian_core::models::{
    Claim, ClaimId, ClaimSource, ClaimStatus, ClaimSubject, ClaimType, Defeater, DefeaterKind,
    DefeaterSeverity,
};
use librarian_core::traits::EvidenceGraphStorage;
use librarian_storage::MemoryGraphStore;

fn claim(id: &str) -> Claim {
    Claim {
        id: ClaimId::from(id),
        claim_type: ClaimType::Behavior,
        proposition: "caches by key".to_string(),
        subject: ClaimSubject {
            id: "cache::get".to_string(),
            name: "cache::get".to_string(),
            subject_type: "function".to_string(),
        },
        source: ClaimSource {
            id: "extract-1".to_string(),
            source_type: "llm_synthesis".to_string(),
        },
        status: ClaimStatus::Active,
        confidence: ConfidenceValue::bounded(0.6, 0.8, BoundsBasis::Theoretical, "static_analysis")
            .unwrap(),
        created_at: Utc::now(),
        last_verified_at: None,
    }
}

fn defeater(id: &str, claim_id: &str) -> Defeater {
    Defeater::new(
        id,
        DefeaterKind::TestFailure,
        DefeaterSeverity::Full,
        vec![ClaimId::from(claim_id)],
        ConfidenceValue::deterministic(true, "cargo test"),
        "login test failed",
        Utc::now(),
    )
    .unwrap()
}

#[test]
fn claim_count_tracks_inserts_and_overwrites() {
    let store = MemoryGraphStore::new();
    assert_eq!(store.claim_count(), 0);
    store.insert_claim(claim("c-1"));
    store.insert_claim(claim("c-2"));
    // Re-inserting the same id replaces, never duplicates.
    store.insert_claim(claim("c-1"));
    assert_eq!(store.claim_count(), 2);
    assert!(store.get_claim(&ClaimId::from("c-2")).unwrap().is_some());
}

#[test]
fn resolving_a_defeater_removes_it_from_the_active_set() {
    let store = MemoryGraphStore::new();
    store.insert_defeater(&defeater("def-1", "c-1")).unwrap();
    store.insert_defeater(&defeater("def-2", "c-2")).unwrap();
    assert_eq!(store.get_active_defeaters().unwrap().len(), 2);

    store.resolve_defeater("def-1").unwrap();
    let active = store.get_active_defeaters().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "def-2");
}

#[test]
fn resolving_an_unknown_defeater_is_not_found() {
    let store = MemoryGraphStore::new();
    let err = store.resolve_defeater("def-nope").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

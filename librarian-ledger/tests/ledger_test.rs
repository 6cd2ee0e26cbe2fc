//! Tests for the evidence ledger: append/query/get, the D7 boundary,
//! subscription dispatch ordering, and chain reconstruction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use librarian_core::confidence::{BoundsBasis, ConfidenceValue};
use librarian_core::models::{EvidenceFilter, EvidenceId, EvidenceKind, NewEvidence, Provenance};
use librarian_ledger::EvidenceLedger;

fn claim_entry(subject: &str) -> NewEvidence {
    NewEvidence::new(
        EvidenceKind::Claim,
        serde_json::json!({ "subject": subject, "proposition": "handles auth" }),
        Provenance::new("extractor", "llm_synthesis"),
    )
    .with_confidence(
        ConfidenceValue::bounded(0.6, 0.8, BoundsBasis::Theoretical, "static_analysis").unwrap(),
    )
}

fn verification_entry() -> NewEvidence {
    NewEvidence::new(
        EvidenceKind::Verification,
        serde_json::json!({ "result": "verified" }),
        Provenance::new("test_runner", "test_execution"),
    )
}

#[test]
fn append_assigns_monotonic_ids_and_timestamps() {
    let ledger = EvidenceLedger::new();
    let a = ledger.append(verification_entry()).unwrap();
    let b = ledger.append(verification_entry()).unwrap();
    assert!(a.id < b.id);
    assert!(!a.payload_hash.is_empty());
}

#[test]
fn claim_with_raw_numeric_payload_confidence_is_d7() {
    let ledger = EvidenceLedger::new();
    let bad = NewEvidence::new(
        EvidenceKind::Claim,
        serde_json::json!({ "proposition": "p", "confidence": 0.7 }),
        Provenance::new("extractor", "llm_synthesis"),
    )
    .with_confidence(ConfidenceValue::deterministic(true, "test"));
    let err = ledger.append(bad).unwrap_err();
    assert!(err.is_d7_violation());
    assert!(ledger.is_empty(), "violating entry must not be stored");
}

#[test]
fn claim_without_typed_confidence_is_d7() {
    let ledger = EvidenceLedger::new();
    let bad = NewEvidence::new(
        EvidenceKind::Claim,
        serde_json::json!({ "proposition": "p" }),
        Provenance::new("extractor", "llm_synthesis"),
    );
    assert!(ledger.append(bad).unwrap_err().is_d7_violation());
}

#[test]
fn claim_with_typed_confidence_succeeds() {
    let ledger = EvidenceLedger::new();
    let entry = ledger.append(claim_entry("auth.rs")).unwrap();
    assert_eq!(entry.kind, EvidenceKind::Claim);
    assert_eq!(ledger.get(entry.id).unwrap().unwrap().id, entry.id);
}

#[test]
fn non_claim_kinds_skip_the_guard() {
    let ledger = EvidenceLedger::new();
    let outcome = NewEvidence::new(
        EvidenceKind::Outcome,
        // A raw number here is fine — only claim boundaries are guarded.
        serde_json::json!({ "confidence": 0.9 }),
        Provenance::new("tracker", "outcome_recording"),
    );
    assert!(ledger.append(outcome).is_ok());
}

#[test]
fn query_preserves_insertion_order_and_limit() {
    let ledger = EvidenceLedger::new();
    for subject in ["a", "b", "c"] {
        ledger.append(claim_entry(subject)).unwrap();
    }
    ledger.append(verification_entry()).unwrap();

    let claims = ledger
        .query(&EvidenceFilter::by_kind(EvidenceKind::Claim))
        .unwrap();
    assert_eq!(claims.len(), 3);
    assert_eq!(claims[0].payload["subject"], "a");
    assert_eq!(claims[2].payload["subject"], "c");

    let limited = ledger
        .query(&EvidenceFilter::by_kind(EvidenceKind::Claim).with_limit(2))
        .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[1].payload["subject"], "b");
}

#[test]
fn session_lookup_filters_and_preserves_insertion_order() {
    let ledger = EvidenceLedger::new();
    let first = ledger
        .append(claim_entry("a").with_session("session-1"))
        .unwrap();
    ledger
        .append(verification_entry().with_session("session-2"))
        .unwrap();
    ledger.append(verification_entry()).unwrap();
    let second = ledger
        .append(verification_entry().with_session("session-1"))
        .unwrap();

    let entries = ledger.get_session_entries("session-1").unwrap();
    assert_eq!(
        entries.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );

    assert!(ledger.get_session_entries("session-3").unwrap().is_empty());
}

#[test]
fn get_unknown_id_is_none_but_chain_is_not_found() {
    let ledger = EvidenceLedger::new();
    assert!(ledger.get(EvidenceId(99)).unwrap().is_none());
    let err = ledger.get_chain(EvidenceId(99)).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn subscriber_runs_before_append_returns() {
    let ledger = EvidenceLedger::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_callback = Arc::clone(&seen);
    let _sub = ledger.subscribe(
        EvidenceFilter::by_kind(EvidenceKind::Claim),
        move |entry| {
            seen_in_callback.lock().unwrap().push(entry.id);
        },
    );

    let entry = ledger.append(claim_entry("x")).unwrap();
    // Notification completed inside append.
    assert_eq!(*seen.lock().unwrap(), vec![entry.id]);

    ledger.append(verification_entry()).unwrap();
    // Filter excluded the verification entry.
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn unsubscribe_is_idempotent() {
    let ledger = EvidenceLedger::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_callback = Arc::clone(&calls);
    let sub = ledger.subscribe(EvidenceFilter::default(), move |_| {
        calls_in_callback.fetch_add(1, Ordering::SeqCst);
    });

    sub.unsubscribe();
    sub.unsubscribe();
    ledger.append(verification_entry()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unsubscribe_from_within_callback_is_safe() {
    let ledger = Arc::new(EvidenceLedger::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_callback = Arc::clone(&calls);
    let handle_slot: Arc<Mutex<Option<librarian_ledger::SubscriptionHandle>>> =
        Arc::new(Mutex::new(None));
    let slot_in_callback = Arc::clone(&handle_slot);

    let sub = ledger.subscribe(EvidenceFilter::default(), move |_| {
        calls_in_callback.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = slot_in_callback.lock().unwrap().take() {
            handle.unsubscribe();
        }
    });
    *handle_slot.lock().unwrap() = Some(sub);

    ledger.append(verification_entry()).unwrap();
    ledger.append(verification_entry()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn callback_may_reenter_and_append() {
    let ledger = Arc::new(EvidenceLedger::new());
    let ledger_in_callback = Arc::clone(&ledger);
    let _sub = ledger.subscribe(
        EvidenceFilter::by_kind(EvidenceKind::Claim),
        move |entry| {
            let follow_up = NewEvidence::new(
                EvidenceKind::Verification,
                serde_json::json!({ "triggered_by": entry.id }),
                Provenance::new("bridge", "auto_detection"),
            )
            .with_related(vec![entry.id]);
            ledger_in_callback.append(follow_up).unwrap();
        },
    );

    ledger.append(claim_entry("reentrant")).unwrap();
    assert_eq!(ledger.len(), 2);
}

#[test]
fn append_batch_is_sequential_append() {
    let ledger = EvidenceLedger::new();
    let appended = ledger
        .append_batch(vec![claim_entry("a"), claim_entry("b")])
        .unwrap();
    assert_eq!(appended.len(), 2);
    assert!(appended[0].id < appended[1].id);
}

#[test]
fn chain_combines_confidence_and_collects_contradictions() {
    let ledger = EvidenceLedger::new();
    let base = ledger.append(claim_entry("base")).unwrap();
    let support = ledger
        .append(
            NewEvidence::new(
                EvidenceKind::Verification,
                serde_json::json!({ "result": "verified" }),
                Provenance::new("runner", "test_execution"),
            )
            .with_related(vec![base.id])
            .with_confidence(ConfidenceValue::measured(0.9, "test_pass_rate").unwrap()),
        )
        .unwrap();
    let contradiction = ledger
        .append(
            NewEvidence::new(
                EvidenceKind::Contradiction,
                serde_json::json!({ "explanation": "conflicting claim" }),
                Provenance::new("detector", "defeater_detection"),
            )
            .with_related(vec![base.id]),
        )
        .unwrap();

    let chain = ledger.get_chain(support.id).unwrap();
    assert_eq!(chain.root, support.id);
    assert_eq!(chain.entries.len(), 2);
    // AND over bounded(0.6,0.8) and measured(0.9): weaker than either alone.
    let effective = chain.chain_confidence.effective().unwrap();
    assert!(effective <= 0.7);
    assert_eq!(chain.contradictions.len(), 1);
    assert_eq!(chain.contradictions[0].id, contradiction.id);
}

proptest::proptest! {
    #[test]
    fn ids_stay_strictly_increasing_across_arbitrary_batches(
        sizes in proptest::collection::vec(1usize..5, 1..6)
    ) {
        let ledger = EvidenceLedger::new();
        let mut last = EvidenceId(0);
        for size in sizes {
            let batch: Vec<NewEvidence> = (0..size).map(|_| verification_entry()).collect();
            for entry in ledger.append_batch(batch).unwrap() {
                proptest::prop_assert!(entry.id > last);
                last = entry.id;
            }
        }
        // Query sees every entry in the same order the ids were assigned.
        let all = ledger.query(&EvidenceFilter::default()).unwrap();
        proptest::prop_assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }
}

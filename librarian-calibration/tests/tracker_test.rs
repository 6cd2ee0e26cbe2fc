//! Integration tests: outcome tracking through a state store and
//! on-demand calibration from tracked history.

use std::sync::Arc;

use librarian_calibration::{ClaimOutcome, ClaimOutcomeTracker};
use librarian_core::config::CalibrationOptions;
use librarian_core::confidence::{BoundsBasis, CalibrationStatus, ConfidenceValue};
use librarian_core::traits::StateStore;
use librarian_storage::MemoryStateStore;

fn bounded(lower: f64, upper: f64) -> ConfidenceValue {
    ConfidenceValue::bounded(lower, upper, BoundsBasis::Theoretical, "static_analysis").unwrap()
}

fn tracker() -> (ClaimOutcomeTracker, Arc<MemoryStateStore>) {
    let store = Arc::new(MemoryStateStore::new());
    (
        ClaimOutcomeTracker::new(store.clone() as Arc<dyn StateStore>),
        store,
    )
}

#[test]
fn outcome_for_unknown_claim_is_not_found() {
    let (tracker, _store) = tracker();
    let err = tracker
        .record_outcome("c-missing", ClaimOutcome::Correct, "test_run", None)
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn absent_stated_confidence_is_rejected() {
    let (tracker, _store) = tracker();
    let err = tracker
        .record_claim(
            "c-1",
            "behavior",
            ConfidenceValue::absent("never measured"),
            None,
        )
        .unwrap_err();
    assert!(err.to_string().contains("effective"));
}

#[test]
fn records_survive_a_new_tracker_over_the_same_store() {
    let (first, store) = tracker();
    first
        .record_claim("c-1", "behavior", bounded(0.7, 0.9), None)
        .unwrap();
    first
        .record_outcome("c-1", ClaimOutcome::Correct, "test_run", None)
        .unwrap();

    // A fresh tracker sees the persisted history.
    let second = ClaimOutcomeTracker::new(store as Arc<dyn StateStore>);
    second
        .record_outcome("c-1", ClaimOutcome::Correct, "review", Some("re-verified".into()))
        .unwrap();
}

#[test]
fn no_history_means_insufficient_data() {
    let (tracker, _store) = tracker();
    let adjustment = tracker
        .adjust_confidence(&bounded(0.7, 0.9), &CalibrationOptions::default())
        .unwrap();
    assert_eq!(adjustment.status, CalibrationStatus::InsufficientData);
    assert_eq!(adjustment.calibrated, adjustment.raw);
}

#[test]
fn end_to_end_calibration_from_tracked_outcomes() {
    let (tracker, _store) = tracker();
    tracker
        .record_claim("c-high", "behavior", bounded(0.7, 0.9), None)
        .unwrap();
    tracker
        .record_outcome("c-high", ClaimOutcome::Correct, "test_run", None)
        .unwrap();
    tracker
        .record_claim("c-low", "behavior", bounded(0.1, 0.3), None)
        .unwrap();
    tracker
        .record_outcome("c-low", ClaimOutcome::Incorrect, "test_run", None)
        .unwrap();

    let options = CalibrationOptions {
        bucket_count: 2,
        min_samples_for_adjustment: 1,
        min_samples_for_full_weight: 1,
    };
    let adjustment = tracker
        .adjust_confidence(&bounded(0.7, 0.9), &options)
        .unwrap();

    // The upper bucket holds one correct outcome, so full weight pulls the
    // stated 0.8 midpoint all the way to 1.0.
    assert!(matches!(
        adjustment.confidence,
        ConfidenceValue::Derived { .. }
    ));
    assert_eq!(adjustment.status, CalibrationStatus::Calibrated);
    assert!((adjustment.calibrated - 1.0).abs() < 1e-9);
    assert!((adjustment.raw - 0.8).abs() < 1e-9);
}

#[test]
fn claims_without_outcomes_contribute_nothing() {
    let (tracker, _store) = tracker();
    tracker
        .record_claim("c-pending", "behavior", bounded(0.7, 0.9), None)
        .unwrap();

    let options = CalibrationOptions {
        bucket_count: 2,
        min_samples_for_adjustment: 1,
        min_samples_for_full_weight: 1,
    };
    let adjustment = tracker
        .adjust_confidence(&bounded(0.7, 0.9), &options)
        .unwrap();
    assert_eq!(adjustment.status, CalibrationStatus::InsufficientData);
    assert_eq!(adjustment.bucket_samples, 0);
}

//! Claim outcome tracking over a generic state store.
//!
//! The tracker persists claim records and their later-observed outcomes as
//! JSON blobs in the state store, and builds calibration reports on demand
//! from that history. There is no cached curve: adjustment is always
//! computed fresh from ground truth.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use librarian_core::config::CalibrationOptions;
use librarian_core::confidence::ConfidenceValue;
use librarian_core::errors::{LibrarianError, LibrarianResult};
use librarian_core::models::{CalibrationAdjustment, CalibrationSample};
use librarian_core::traits::StateStore;

use crate::adjust::adjust_confidence_value;
use crate::curve::{build_calibration_report, compute_calibration_curve};

const CLAIMS_KEY: &str = "outcome_tracker/claims";
const OUTCOMES_KEY: &str = "outcome_tracker/outcomes";
const DATASET_ID: &str = "outcome_tracker";

/// A claim as registered with the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedClaim {
    pub claim_id: String,
    pub claim_type: String,
    pub stated_confidence: ConfidenceValue,
    pub category: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Ground-truth verdict on a tracked claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    Correct,
    Incorrect,
}

impl ClaimOutcome {
    fn as_sample_outcome(self) -> f64 {
        match self {
            Self::Correct => 1.0,
            Self::Incorrect => 0.0,
        }
    }
}

/// An observed outcome linked to a tracked claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedOutcome {
    pub claim_id: String,
    pub outcome: ClaimOutcome,
    pub verified_by: String,
    pub observation: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Records claims and outcomes, and calibrates confidence against them.
pub struct ClaimOutcomeTracker {
    store: Arc<dyn StateStore>,
    /// Serializes load-modify-save cycles on the two persisted lists.
    write_lock: Mutex<()>,
}

impl ClaimOutcomeTracker {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Persist a claim record with its stated confidence.
    pub fn record_claim(
        &self,
        claim_id: impl Into<String>,
        claim_type: impl Into<String>,
        stated_confidence: ConfidenceValue,
        category: Option<String>,
    ) -> LibrarianResult<TrackedClaim> {
        if stated_confidence.effective().is_none() {
            return Err(LibrarianError::validation(
                "tracked claims need an effective stated confidence",
            ));
        }
        let record = TrackedClaim {
            claim_id: claim_id.into(),
            claim_type: claim_type.into(),
            stated_confidence,
            category,
            recorded_at: Utc::now(),
        };

        let _guard = self.write_lock.lock().expect("tracker lock poisoned");
        let mut claims = self.load::<TrackedClaim>(CLAIMS_KEY)?;
        claims.push(record.clone());
        self.save(CLAIMS_KEY, &claims)?;
        info!(claim_id = %record.claim_id, "claim tracked");
        Ok(record)
    }

    /// Append an outcome for a previously recorded claim.
    pub fn record_outcome(
        &self,
        claim_id: &str,
        outcome: ClaimOutcome,
        verified_by: impl Into<String>,
        observation: Option<String>,
    ) -> LibrarianResult<TrackedOutcome> {
        let _guard = self.write_lock.lock().expect("tracker lock poisoned");
        let claims = self.load::<TrackedClaim>(CLAIMS_KEY)?;
        if !claims.iter().any(|c| c.claim_id == claim_id) {
            return Err(LibrarianError::not_found("tracked claim", claim_id));
        }

        let record = TrackedOutcome {
            claim_id: claim_id.to_string(),
            outcome,
            verified_by: verified_by.into(),
            observation,
            recorded_at: Utc::now(),
        };
        let mut outcomes = self.load::<TrackedOutcome>(OUTCOMES_KEY)?;
        outcomes.push(record.clone());
        self.save(OUTCOMES_KEY, &outcomes)?;
        info!(claim_id, ?outcome, "outcome recorded");
        Ok(record)
    }

    /// Calibrate `value` against everything this tracker has observed.
    ///
    /// Builds the report fresh from the persisted (claim, outcome) pairs on
    /// every call. Claims without an outcome contribute nothing.
    pub fn adjust_confidence(
        &self,
        value: &ConfidenceValue,
        options: &CalibrationOptions,
    ) -> LibrarianResult<CalibrationAdjustment> {
        let samples = self.calibration_samples()?;
        let curve = compute_calibration_curve(&samples, options.bucket_count)?;
        let report = build_calibration_report(DATASET_ID, curve, Utc::now());
        adjust_confidence_value(value, &report, options)
    }

    /// Join tracked claims to their outcomes as calibration samples.
    fn calibration_samples(&self) -> LibrarianResult<Vec<CalibrationSample>> {
        let claims = self.load::<TrackedClaim>(CLAIMS_KEY)?;
        let outcomes = self.load::<TrackedOutcome>(OUTCOMES_KEY)?;
        let mut samples = Vec::new();
        for outcome in &outcomes {
            let Some(claim) = claims.iter().find(|c| c.claim_id == outcome.claim_id) else {
                continue;
            };
            let Some(confidence) = claim.stated_confidence.effective() else {
                continue;
            };
            samples.push(CalibrationSample {
                confidence,
                outcome: outcome.outcome.as_sample_outcome(),
            });
        }
        Ok(samples)
    }

    fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> LibrarianResult<Vec<T>> {
        match self.store.get_state(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save<T: Serialize>(&self, key: &str, records: &[T]) -> LibrarianResult<()> {
        self.store.set_state(key, &serde_json::to_string(records)?)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::{CalibrationStatus, ConfidenceValue};

/// One (stated confidence, observed outcome) pair. Outcome is 1.0 for
/// correct, 0.0 for incorrect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub confidence: f64,
    pub outcome: f64,
}

/// One equal-width partition of `[0, 1]` stated confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBucket {
    pub lower: f64,
    pub upper: f64,
    pub sample_count: usize,
    /// Mean outcome of samples in this bucket; `None` when empty.
    pub empirical_accuracy: Option<f64>,
}

impl CalibrationBucket {
    pub fn contains(&self, confidence: f64) -> bool {
        confidence >= self.lower && (confidence < self.upper || (self.upper - 1.0).abs() < 1e-12)
    }
}

/// Empirical accuracy curve over confidence buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub bucket_count: usize,
    pub buckets: Vec<CalibrationBucket>,
}

impl CalibrationCurve {
    /// The bucket whose range contains `confidence`, if any.
    pub fn bucket_for(&self, confidence: f64) -> Option<&CalibrationBucket> {
        self.buckets.iter().find(|b| b.contains(confidence))
    }
}

/// A curve plus identity and computation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub dataset_id: String,
    pub curve: CalibrationCurve,
    pub computed_at: DateTime<Utc>,
}

/// Output of adjusting one stated confidence against a report.
/// `confidence` is always the `Derived` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationAdjustment {
    pub confidence: ConfidenceValue,
    pub raw: f64,
    pub calibrated: f64,
    pub status: CalibrationStatus,
    /// Samples in the bucket the raw value fell into.
    pub bucket_samples: usize,
}

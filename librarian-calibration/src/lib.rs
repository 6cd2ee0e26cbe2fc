//! # librarian-calibration
//!
//! Turns tracked (claim, outcome) history into empirical accuracy curves
//! and adjusts stated confidence against them. Adjustment always returns a
//! `Derived` confidence value, so downstream code can tell calibrated
//! confidence apart from as-stated confidence at the type level.

pub mod adjust;
pub mod curve;
pub mod tracker;

pub use adjust::adjust_confidence_value;
pub use curve::{build_calibration_report, compute_calibration_curve};
pub use tracker::{ClaimOutcome, ClaimOutcomeTracker, TrackedClaim, TrackedOutcome};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{LibrarianError, LibrarianResult};

/// What a bounded interval estimate is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsBasis {
    /// Derived from a model or argument, not observation.
    Theoretical,
    /// Derived from a direct measurement with known error.
    Measured,
    /// Derived from accumulated observations.
    Empirical,
}

/// Whether a derived confidence was actually adjusted by calibration data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    Calibrated,
    InsufficientData,
}

/// The variant family a confidence value belongs to.
///
/// Defeater kinds declare which class they are entitled to carry
/// (a heuristic signal may never masquerade as a hard fact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceClass {
    Deterministic,
    Bounded,
    Derived,
    Measured,
    Absent,
}

/// Typed confidence. Immutable once constructed; operators return new values.
///
/// Internally tagged on `"type"` so the wire form is always an object —
/// `0.7` is not a confidence, and deserializing one fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfidenceValue {
    /// A fact established by direct observation (a test passed or it didn't).
    Deterministic { value: bool, basis: String },
    /// An interval estimate; `0 <= lower <= upper <= 1`.
    Bounded {
        lower: f64,
        upper: f64,
        basis: BoundsBasis,
        source: String,
    },
    /// Produced only by the calibration engine.
    Derived {
        raw: f64,
        calibrated: f64,
        status: CalibrationStatus,
        source: String,
    },
    /// A direct empirical measurement.
    Measured { value: f64, source: String },
    /// Explicitly no confidence assignable. Not zero — zero is itself a claim.
    Absent { reason: String },
}

fn in_unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v) && v.is_finite()
}

impl ConfidenceValue {
    pub fn deterministic(value: bool, basis: impl Into<String>) -> Self {
        Self::Deterministic {
            value,
            basis: basis.into(),
        }
    }

    /// Construct a bounded interval. Fails unless `0 <= lower <= upper <= 1`.
    pub fn bounded(
        lower: f64,
        upper: f64,
        basis: BoundsBasis,
        source: impl Into<String>,
    ) -> LibrarianResult<Self> {
        if !in_unit(lower) || !in_unit(upper) || lower > upper {
            return Err(LibrarianError::validation(format!(
                "invalid bounded confidence [{lower}, {upper}]: bounds must satisfy 0 <= lower <= upper <= 1"
            )));
        }
        Ok(Self::Bounded {
            lower,
            upper,
            basis,
            source: source.into(),
        })
    }

    pub fn measured(value: f64, source: impl Into<String>) -> LibrarianResult<Self> {
        if !in_unit(value) {
            return Err(LibrarianError::validation(format!(
                "measured confidence {value} outside [0, 1]"
            )));
        }
        Ok(Self::Measured {
            value,
            source: source.into(),
        })
    }

    /// Construct a derived value. Only the calibration engine should call
    /// this; the variant exists so callers can tell calibrated confidence
    /// from as-stated confidence at the type level.
    pub fn derived(
        raw: f64,
        calibrated: f64,
        status: CalibrationStatus,
        source: impl Into<String>,
    ) -> LibrarianResult<Self> {
        if !in_unit(raw) || !in_unit(calibrated) {
            return Err(LibrarianError::validation(format!(
                "derived confidence raw={raw} calibrated={calibrated} outside [0, 1]"
            )));
        }
        Ok(Self::Derived {
            raw,
            calibrated,
            status,
            source: source.into(),
        })
    }

    pub fn absent(reason: impl Into<String>) -> Self {
        Self::Absent {
            reason: reason.into(),
        }
    }

    /// Reduce to a single representative scalar.
    ///
    /// `None` for `Absent` — an unassignable confidence must never be
    /// silently treated as zero.
    pub fn effective(&self) -> Option<f64> {
        match self {
            Self::Deterministic { value, .. } => Some(if *value { 1.0 } else { 0.0 }),
            Self::Bounded { lower, upper, .. } => Some((lower + upper) / 2.0),
            Self::Derived { calibrated, .. } => Some(*calibrated),
            Self::Measured { value, .. } => Some(*value),
            Self::Absent { .. } => None,
        }
    }

    /// Lower bound of the value viewed as an interval.
    pub fn lower(&self) -> Option<f64> {
        match self {
            Self::Bounded { lower, .. } => Some(*lower),
            other => other.effective(),
        }
    }

    /// Upper bound of the value viewed as an interval.
    pub fn upper(&self) -> Option<f64> {
        match self {
            Self::Bounded { upper, .. } => Some(*upper),
            other => other.effective(),
        }
    }

    /// Compare the effective scalar against a threshold.
    /// `Absent` never meets any threshold.
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.effective().is_some_and(|v| v >= threshold)
    }

    pub fn class(&self) -> ConfidenceClass {
        match self {
            Self::Deterministic { .. } => ConfidenceClass::Deterministic,
            Self::Bounded { .. } => ConfidenceClass::Bounded,
            Self::Derived { .. } => ConfidenceClass::Derived,
            Self::Measured { .. } => ConfidenceClass::Measured,
            Self::Absent { .. } => ConfidenceClass::Absent,
        }
    }

    /// The provenance string explaining where this value came from.
    pub fn provenance(&self) -> &str {
        match self {
            Self::Deterministic { basis, .. } => basis,
            Self::Bounded { source, .. } => source,
            Self::Derived { source, .. } => source,
            Self::Measured { source, .. } => source,
            Self::Absent { reason } => reason,
        }
    }
}

impl fmt::Display for ConfidenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deterministic { value, basis } => {
                write!(f, "deterministic({value}, {basis})")
            }
            Self::Bounded {
                lower,
                upper,
                source,
                ..
            } => write!(f, "bounded[{lower:.3}, {upper:.3}]({source})"),
            Self::Derived {
                raw, calibrated, ..
            } => write!(f, "derived({raw:.3} -> {calibrated:.3})"),
            Self::Measured { value, source } => write!(f, "measured({value:.3}, {source})"),
            Self::Absent { reason } => write!(f, "absent({reason})"),
        }
    }
}

/// The dynamic half of the D7 rule: reject a JSON payload field that carries
/// a bare number where a typed confidence is required.
///
/// Typed Rust paths are covered statically; this guard covers data arriving
/// through `serde_json::Value` payloads (extraction output, wire input).
pub fn ensure_typed_confidence(
    value: &serde_json::Value,
    boundary: &str,
) -> LibrarianResult<ConfidenceValue> {
    if value.is_number() {
        return Err(LibrarianError::d7_violation(
            boundary,
            format!("raw numeric confidence {value} where a ConfidenceValue is required"),
        ));
    }
    serde_json::from_value::<ConfidenceValue>(value.clone()).map_err(|e| {
        LibrarianError::validation(format!(
            "{boundary}: confidence field is not a valid ConfidenceValue: {e}"
        ))
    })
}

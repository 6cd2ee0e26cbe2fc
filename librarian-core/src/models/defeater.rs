use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::{ConfidenceClass, ConfidenceValue};
use crate::errors::{LibrarianError, LibrarianResult};

use super::claim::ClaimId;

/// What kind of evidence undermines the affected claims.
///
/// Each kind declares, at definition time, the one confidence class it is
/// entitled to carry: a deterministic observation may never be downgraded to
/// "maybe", and a heuristic signal may never masquerade as a hard fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeaterKind {
    /// A test covering the claim's subject was observed failing.
    TestFailure,
    /// The claim's evidence has aged past the staleness threshold.
    Staleness,
}

impl DefeaterKind {
    /// The confidence class this kind is entitled to use.
    pub fn confidence_class(&self) -> ConfidenceClass {
        match self {
            Self::TestFailure => ConfidenceClass::Deterministic,
            Self::Staleness => ConfidenceClass::Bounded,
        }
    }

    pub fn permits(&self, confidence: &ConfidenceValue) -> bool {
        confidence.class() == self.confidence_class()
    }
}

impl std::fmt::Display for DefeaterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TestFailure => f.write_str("test_failure"),
            Self::Staleness => f.write_str("staleness"),
        }
    }
}

/// Ordered: `Warning < Partial < Full`. The bridge compares against its
/// configured minimum before recording a detection in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeaterSeverity {
    Warning,
    Partial,
    Full,
}

impl std::fmt::Display for DefeaterSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Partial => f.write_str("partial"),
            Self::Full => f.write_str("full"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeaterStatus {
    Active,
    Resolved,
}

/// How a human (or downstream process) resolved a defeater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// The defeater stands; the claim was wrong.
    Accepted,
    /// The defeater itself was wrong.
    Invalidated,
    /// The underlying cause was fixed.
    Addressed,
}

impl ResolutionOutcome {
    /// Ledger result string for a resolution entry.
    pub fn as_result(&self) -> &'static str {
        match self {
            Self::Accepted | Self::Addressed => "verified",
            Self::Invalidated => "refuted",
        }
    }
}

/// Evidence that undermines one or more claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defeater {
    pub id: String,
    pub kind: DefeaterKind,
    pub severity: DefeaterSeverity,
    pub affected_claims: Vec<ClaimId>,
    pub status: DefeaterStatus,
    pub confidence: ConfidenceValue,
    pub details: String,
    pub detected_at: DateTime<Utc>,
}

impl Defeater {
    /// Construct a defeater, enforcing the kind's confidence-class contract.
    pub fn new(
        id: impl Into<String>,
        kind: DefeaterKind,
        severity: DefeaterSeverity,
        affected_claims: Vec<ClaimId>,
        confidence: ConfidenceValue,
        details: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> LibrarianResult<Self> {
        if !kind.permits(&confidence) {
            return Err(LibrarianError::validation(format!(
                "defeater kind {kind} requires {:?} confidence, got {:?}",
                kind.confidence_class(),
                confidence.class()
            )));
        }
        Ok(Self {
            id: id.into(),
            kind,
            severity,
            affected_claims,
            status: DefeaterStatus::Active,
            confidence,
            details: details.into(),
            detected_at,
        })
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceValue;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(pub String);

impl ClaimId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClaimId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Active,
    Defeated,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// What a piece of code does.
    Behavior,
    /// How code is organized.
    Structure,
    /// What depends on what.
    Dependency,
    /// An observed test run. Carries deterministic confidence.
    TestResult,
    /// Why a piece of code exists.
    Purpose,
}

/// The code entity a claim is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubject {
    pub id: String,
    pub name: String,
    pub subject_type: String,
}

/// Where a claim was produced (an extraction pass, a synthesis run, a test).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSource {
    pub id: String,
    pub source_type: String,
}

/// A proposition about the codebase. Created by extraction; mutated only via
/// confidence/status updates; never hard-deleted, so superseded claims keep
/// their history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub claim_type: ClaimType,
    pub proposition: String,
    pub subject: ClaimSubject,
    pub source: ClaimSource,
    pub status: ClaimStatus,
    pub confidence: ConfidenceValue,
    pub created_at: DateTime<Utc>,
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl Claim {
    /// Age of the freshest supporting observation.
    pub fn evidence_age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_verified_at.unwrap_or(self.created_at)
    }
}

/// Filter for graph-store claim queries.
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    pub status: Option<ClaimStatus>,
    pub subject_id: Option<String>,
}

impl ClaimFilter {
    pub fn active() -> Self {
        Self {
            status: Some(ClaimStatus::Active),
            ..Default::default()
        }
    }

    pub fn matches(&self, claim: &Claim) -> bool {
        if let Some(status) = self.status {
            if claim.status != status {
                return false;
            }
        }
        if let Some(subject) = &self.subject_id {
            if claim.subject.id != *subject {
                return false;
            }
        }
        true
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::claim::ClaimId;
use super::defeater::DefeaterSeverity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionType {
    /// Direct opposition ("always X" vs "never X", or X vs not-X).
    Direct,
    /// Newer claim supersedes an older one on the same subject.
    Supersession,
    /// Overlapping but not fully opposing propositions.
    Partial,
}

impl ContradictionType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Supersession => "supersession",
            Self::Partial => "partial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionStatus {
    Unresolved,
    Resolved,
}

/// Two claims that cannot both be true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contradiction {
    pub id: String,
    pub claim_a: ClaimId,
    pub claim_b: ClaimId,
    pub contradiction_type: ContradictionType,
    pub explanation: String,
    pub status: ContradictionStatus,
    pub severity: DefeaterSeverity,
    pub detected_at: DateTime<Utc>,
}

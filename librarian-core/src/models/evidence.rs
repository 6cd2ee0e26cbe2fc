use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceValue;

/// Ledger entry identifier. Assigned sequentially on append, so ordering by
/// id agrees with insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EvidenceId(pub u64);

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ev-{:08}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Claim,
    Verification,
    Contradiction,
    Outcome,
    Extraction,
}

/// Where an entry came from and by which mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub method: String,
}

impl Provenance {
    pub fn new(source: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            method: method.into(),
        }
    }
}

/// An immutable, append-only evidence record. The ledger is the single
/// source of truth for reconstructing defeater and contradiction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub id: EvidenceId,
    pub timestamp: DateTime<Utc>,
    pub kind: EvidenceKind,
    /// Kind-specific payload. Claim-kind payloads are D7-guarded: any nested
    /// confidence field must be a typed object, never a bare number.
    pub payload: serde_json::Value,
    pub provenance: Provenance,
    pub related_entries: Vec<EvidenceId>,
    pub session_id: Option<String>,
    pub confidence: Option<ConfidenceValue>,
    /// blake3 hash of the payload at append time, for audit integrity.
    pub payload_hash: String,
}

/// What callers hand to `append` — the ledger assigns id, timestamp, and
/// payload hash.
#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub kind: EvidenceKind,
    pub payload: serde_json::Value,
    pub provenance: Provenance,
    pub related_entries: Vec<EvidenceId>,
    pub session_id: Option<String>,
    pub confidence: Option<ConfidenceValue>,
}

impl NewEvidence {
    pub fn new(kind: EvidenceKind, payload: serde_json::Value, provenance: Provenance) -> Self {
        Self {
            kind,
            payload,
            provenance,
            related_entries: Vec::new(),
            session_id: None,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: ConfidenceValue) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_related(mut self, related: Vec<EvidenceId>) -> Self {
        self.related_entries = related;
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Query filter. All present fields must match; matches come back in
/// insertion order, truncated to `limit`.
#[derive(Debug, Clone, Default)]
pub struct EvidenceFilter {
    pub kinds: Option<Vec<EvidenceKind>>,
    pub session_id: Option<String>,
    /// Matches `provenance.method` exactly.
    pub method: Option<String>,
    pub limit: Option<usize>,
}

impl EvidenceFilter {
    pub fn by_kind(kind: EvidenceKind) -> Self {
        Self {
            kinds: Some(vec![kind]),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an entry matches, ignoring `limit`.
    pub fn matches(&self, entry: &EvidenceEntry) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&entry.kind) {
                return false;
            }
        }
        if let Some(session) = &self.session_id {
            if entry.session_id.as_deref() != Some(session.as_str()) {
                return false;
            }
        }
        if let Some(method) = &self.method {
            if entry.provenance.method != *method {
                return false;
            }
        }
        true
    }
}

/// A lineage reconstruction rooted at one entry: all entries reachable
/// through `related_entries`, the AND-combined chain confidence, and any
/// contradiction entries touching a chain member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceChain {
    pub root: EvidenceId,
    pub entries: Vec<EvidenceEntry>,
    pub chain_confidence: ConfidenceValue,
    pub contradictions: Vec<EvidenceEntry>,
}

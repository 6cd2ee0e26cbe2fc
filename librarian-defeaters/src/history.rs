//! History reconstruction from the ledger.
//!
//! Detection entries carry structured payload fields (`defeater_type`,
//! `severity`, `affected_claims`), so reconstruction is a field read.
//! Entries written by older producers only have free-text `details`; a
//! narrow `type=<t> severity=<s>` regex recovers those best-effort. The
//! ledger stays the source of truth either way.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use librarian_core::models::{
    ClaimId, ContradictionStatus, ContradictionType, DefeaterKind, DefeaterSeverity,
    DefeaterStatus, EvidenceEntry, EvidenceId,
};

static LEGACY_DETAILS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"type=(\w+)\s+severity=(\w+)").expect("static regex"));

/// A defeater as reconstructed from a ledger detection entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructedDefeater {
    pub defeater_id: String,
    pub kind: Option<DefeaterKind>,
    pub severity: Option<DefeaterSeverity>,
    pub affected_claims: Vec<ClaimId>,
    pub status: DefeaterStatus,
    pub details: String,
    pub entry_id: EvidenceId,
    pub detected_at: DateTime<Utc>,
}

/// A contradiction as reconstructed from a ledger contradiction entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructedContradiction {
    pub contradiction_id: String,
    pub claim_a: Option<ClaimId>,
    pub claim_b: Option<ClaimId>,
    pub contradiction_type: Option<ContradictionType>,
    pub explanation: String,
    pub severity: Option<DefeaterSeverity>,
    pub status: ContradictionStatus,
    pub entry_id: EvidenceId,
    pub detected_at: DateTime<Utc>,
}

fn parse_kind(raw: &str) -> Option<DefeaterKind> {
    match raw {
        "test_failure" => Some(DefeaterKind::TestFailure),
        "staleness" => Some(DefeaterKind::Staleness),
        _ => None,
    }
}

fn parse_severity(raw: &str) -> Option<DefeaterSeverity> {
    match raw {
        "warning" => Some(DefeaterSeverity::Warning),
        "partial" => Some(DefeaterSeverity::Partial),
        "full" => Some(DefeaterSeverity::Full),
        _ => None,
    }
}

/// Reconstruct a defeater from a `verification`-kind detection entry.
/// Returns `None` when the entry carries no recognizable defeater id.
pub fn defeater_from_entry(entry: &EvidenceEntry, resolved: bool) -> Option<ReconstructedDefeater> {
    let payload = entry.payload.as_object()?;
    let defeater_id = payload.get("defeater_id")?.as_str()?.to_string();
    let details = payload
        .get("details")
        .and_then(|d| d.as_str())
        .unwrap_or_default()
        .to_string();

    // Structured fields first, free-text fallback second.
    let mut kind = payload
        .get("defeater_type")
        .and_then(|v| v.as_str())
        .and_then(parse_kind);
    let mut severity = payload
        .get("severity")
        .and_then(|v| v.as_str())
        .and_then(parse_severity);
    if kind.is_none() || severity.is_none() {
        if let Some(captures) = LEGACY_DETAILS_RE.captures(&details) {
            kind = kind.or_else(|| parse_kind(&captures[1]));
            severity = severity.or_else(|| parse_severity(&captures[2]));
        }
    }

    let affected_claims = payload
        .get("affected_claims")
        .and_then(|v| v.as_array())
        .map(|ids| {
            ids.iter()
                .filter_map(|v| v.as_str())
                .map(ClaimId::from)
                .collect()
        })
        .unwrap_or_default();

    Some(ReconstructedDefeater {
        defeater_id,
        kind,
        severity,
        affected_claims,
        status: if resolved {
            DefeaterStatus::Resolved
        } else {
            DefeaterStatus::Active
        },
        details,
        entry_id: entry.id,
        detected_at: entry.timestamp,
    })
}

fn parse_contradiction_type(raw: &str) -> Option<ContradictionType> {
    match raw {
        "direct" => Some(ContradictionType::Direct),
        "supersession" => Some(ContradictionType::Supersession),
        "partial" => Some(ContradictionType::Partial),
        _ => None,
    }
}

/// Reconstruct a contradiction from a `contradiction`-kind entry.
pub fn contradiction_from_entry(entry: &EvidenceEntry) -> Option<ReconstructedContradiction> {
    let payload = entry.payload.as_object()?;
    let contradiction_id = payload.get("contradiction_id")?.as_str()?.to_string();
    Some(ReconstructedContradiction {
        contradiction_id,
        claim_a: payload
            .get("claim_a")
            .and_then(|v| v.as_str())
            .map(ClaimId::from),
        claim_b: payload
            .get("claim_b")
            .and_then(|v| v.as_str())
            .map(ClaimId::from),
        contradiction_type: payload
            .get("contradiction_type")
            .and_then(|v| v.as_str())
            .and_then(parse_contradiction_type),
        explanation: payload
            .get("explanation")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        severity: payload
            .get("severity")
            .and_then(|v| v.as_str())
            .and_then(parse_severity),
        // The ledger records detections; without a resolution entry the
        // contradiction is still open.
        status: ContradictionStatus::Unresolved,
        entry_id: entry.id,
        detected_at: entry.timestamp,
    })
}

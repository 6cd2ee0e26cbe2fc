//! Direct contradictions between active claims on the same subject.
//!
//! Two heuristics over extraction output: absolute statement conflicts
//! ("always X" vs "never X") and plain negation pairs ("X" vs
//! "does not X" / "not X").

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use librarian_core::models::{
    Claim, ClaimStatus, Contradiction, ContradictionStatus, ContradictionType, DefeaterSeverity,
};

static ALWAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(always|must always|every time|without exception|invariably)\b")
        .expect("static regex")
});

static NEVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(never|must never|under no circumstances|in no case)\b")
        .expect("static regex")
});

static NEGATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(does not|doesn't|no longer|is not|isn't)\b").expect("static regex")
});

/// Stable id regardless of which claim came first.
fn contradiction_id(a: &Claim, b: &Claim) -> String {
    let (first, second) = if a.id.as_str() <= b.id.as_str() {
        (a, b)
    } else {
        (b, a)
    };
    format!("con:direct:{}:{}", first.id, second.id)
}

/// Significant word overlap between two propositions, ignoring short words.
fn propositions_overlap(a: &str, b: &str) -> bool {
    let a_words: Vec<String> = a
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect();
    let b_words: Vec<String> = b
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect();
    if a_words.is_empty() || b_words.is_empty() {
        return false;
    }
    let overlap = a_words.iter().filter(|w| b_words.contains(w)).count();
    let min_len = a_words.len().min(b_words.len());
    overlap as f64 / min_len as f64 >= 0.3
}

fn conflicts(a: &str, b: &str) -> bool {
    let absolute_conflict = (ALWAYS_RE.is_match(a) && NEVER_RE.is_match(b))
        || (NEVER_RE.is_match(a) && ALWAYS_RE.is_match(b));
    let negation_conflict = NEGATION_RE.is_match(a) != NEGATION_RE.is_match(b);
    (absolute_conflict || negation_conflict) && propositions_overlap(a, b)
}

pub fn detect(claims: &[Claim], now: DateTime<Utc>) -> Vec<Contradiction> {
    let active: Vec<&Claim> = claims
        .iter()
        .filter(|c| c.status == ClaimStatus::Active)
        .collect();

    let mut found = Vec::new();
    for (i, a) in active.iter().enumerate() {
        for b in active.iter().skip(i + 1) {
            if a.subject.id != b.subject.id {
                continue;
            }
            if conflicts(&a.proposition, &b.proposition) {
                found.push(Contradiction {
                    id: contradiction_id(a, b),
                    claim_a: a.id.clone(),
                    claim_b: b.id.clone(),
                    contradiction_type: ContradictionType::Direct,
                    explanation: format!(
                        "'{}' vs '{}' on subject {}",
                        a.proposition, b.proposition, a.subject.name
                    ),
                    status: ContradictionStatus::Unresolved,
                    severity: DefeaterSeverity::Full,
                    detected_at: now,
                });
            }
        }
    }
    found
}

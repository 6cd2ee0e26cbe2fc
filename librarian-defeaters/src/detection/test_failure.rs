//! Test-failure defeaters.
//!
//! A `TestResult` claim with `deterministic(false)` confidence is an
//! observed failing test run. Every other active claim about the same
//! subject is undermined by it — and since the observation is a hard fact,
//! the defeater carries deterministic confidence.

use chrono::{DateTime, Utc};

use librarian_core::confidence::ConfidenceValue;
use librarian_core::errors::LibrarianResult;
use librarian_core::models::{
    Claim, ClaimStatus, ClaimType, Defeater, DefeaterKind, DefeaterSeverity,
};

/// Deterministic defeater id so repeated runs converge on the same finding.
fn defeater_id(failed_test: &Claim, undermined: &Claim) -> String {
    format!("def:test_failure:{}:{}", failed_test.id, undermined.id)
}

pub fn detect(claims: &[Claim], now: DateTime<Utc>) -> LibrarianResult<Vec<Defeater>> {
    let failed_tests: Vec<&Claim> = claims
        .iter()
        .filter(|c| c.claim_type == ClaimType::TestResult)
        .filter(|c| {
            matches!(
                c.confidence,
                ConfidenceValue::Deterministic { value: false, .. }
            )
        })
        .collect();

    let mut defeaters = Vec::new();
    for failed in &failed_tests {
        for undermined in claims.iter().filter(|c| {
            c.status == ClaimStatus::Active
                && c.claim_type != ClaimType::TestResult
                && c.subject.id == failed.subject.id
        }) {
            defeaters.push(Defeater::new(
                defeater_id(failed, undermined),
                DefeaterKind::TestFailure,
                DefeaterSeverity::Full,
                vec![undermined.id.clone()],
                ConfidenceValue::deterministic(
                    true,
                    format!("test '{}' observed failing", failed.proposition),
                ),
                format!(
                    "test failure on {} undermines: {}",
                    failed.subject.name, undermined.proposition
                ),
                now,
            )?);
        }
    }
    Ok(defeaters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use librarian_core::confidence::BoundsBasis;
    use librarian_core::models::{ClaimId, ClaimSource, ClaimSubject};

    fn claim(id: &str, claim_type: ClaimType, subject: &str) -> Claim {
        Claim {
            id: ClaimId::from(id),
            claim_type,
            proposition: format!("proposition about {subject}"),
            subject: ClaimSubject {
                id: subject.to_string(),
                name: subject.to_string(),
                subject_type: "function".to_string(),
            },
            source: ClaimSource {
                id: "src-1".to_string(),
                source_type: "extraction".to_string(),
            },
            status: ClaimStatus::Active,
            confidence: ConfidenceValue::bounded(0.6, 0.8, BoundsBasis::Theoretical, "t").unwrap(),
            created_at: Utc::now(),
            last_verified_at: None,
        }
    }

    #[test]
    fn failing_test_undermines_claims_on_same_subject() {
        let mut failed = claim("t1", ClaimType::TestResult, "auth::login");
        failed.confidence = ConfidenceValue::deterministic(false, "cargo test");
        let behavior = claim("c1", ClaimType::Behavior, "auth::login");
        let unrelated = claim("c2", ClaimType::Behavior, "parser::parse");

        let defeaters = detect(&[failed, behavior, unrelated], Utc::now()).unwrap();
        assert_eq!(defeaters.len(), 1);
        assert_eq!(defeaters[0].affected_claims[0], ClaimId::from("c1"));
        assert_eq!(defeaters[0].severity, DefeaterSeverity::Full);
        assert!(matches!(
            defeaters[0].confidence,
            ConfidenceValue::Deterministic { value: true, .. }
        ));
    }

    #[test]
    fn passing_test_produces_nothing() {
        let mut passed = claim("t1", ClaimType::TestResult, "auth::login");
        passed.confidence = ConfidenceValue::deterministic(true, "cargo test");
        let behavior = claim("c1", ClaimType::Behavior, "auth::login");
        assert!(detect(&[passed, behavior], Utc::now()).unwrap().is_empty());
    }
}

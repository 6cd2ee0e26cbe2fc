//! Staleness defeaters.
//!
//! Claims whose freshest supporting observation is older than the threshold
//! get a bounded-confidence defeater: age makes invalidation *likely*, not
//! certain, so the interval widens from a guess toward near-certainty as
//! the evidence keeps aging.

use chrono::{DateTime, Utc};

use librarian_core::config::DetectionConfig;
use librarian_core::confidence::{BoundsBasis, ConfidenceValue};
use librarian_core::errors::LibrarianResult;
use librarian_core::models::{Claim, ClaimStatus, ClaimType, Defeater, DefeaterKind, DefeaterSeverity};

fn defeater_id(claim: &Claim) -> String {
    format!("def:staleness:{}", claim.id)
}

pub fn detect(
    claims: &[Claim],
    now: DateTime<Utc>,
    config: &DetectionConfig,
) -> LibrarianResult<Vec<Defeater>> {
    let mut defeaters = Vec::new();
    for claim in claims.iter().filter(|c| c.status == ClaimStatus::Active) {
        // Test observations are point-in-time facts; aging them is the
        // test-failure strategy's concern, not staleness.
        if claim.claim_type == ClaimType::TestResult {
            continue;
        }
        let age_days = claim.evidence_age(now).num_days();
        if age_days <= config.staleness_threshold_days {
            continue;
        }

        let over = (age_days - config.staleness_threshold_days) as f64;
        let window = (config.staleness_escalation_days - config.staleness_threshold_days).max(1) as f64;
        let progress = (over / window).min(1.0);

        // Interval slides up and narrows as the claim keeps aging.
        let lower = 0.2 + 0.5 * progress;
        let upper = (lower + 0.3 - 0.1 * progress).min(0.95);
        let severity = if age_days >= config.staleness_escalation_days {
            DefeaterSeverity::Partial
        } else {
            DefeaterSeverity::Warning
        };

        defeaters.push(Defeater::new(
            defeater_id(claim),
            DefeaterKind::Staleness,
            severity,
            vec![claim.id.clone()],
            ConfidenceValue::bounded(
                lower,
                upper,
                BoundsBasis::Empirical,
                format!("evidence age {age_days}d past {}d threshold", config.staleness_threshold_days),
            )?,
            format!(
                "claim about {} unverified for {age_days} days: {}",
                claim.subject.name, claim.proposition
            ),
            now,
        )?);
    }
    Ok(defeaters)
}

//! Detection strategy registry.
//!
//! Each strategy scans active claims and produces defeaters or
//! contradictions with the confidence class its cause is entitled to:
//! a test observation is deterministic, an age estimate is bounded.

pub mod direct_conflict;
pub mod staleness;
pub mod test_failure;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use librarian_core::config::DetectionConfig;
use librarian_core::errors::LibrarianResult;
use librarian_core::models::{Claim, ClaimFilter, Contradiction, Defeater};
use librarian_core::traits::EvidenceGraphStorage;

/// Input to one detection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionContext {
    pub timestamp: DateTime<Utc>,
    /// Claims appended since the last run; scanned alongside stored actives.
    pub new_claims: Vec<Claim>,
}

impl DetectionContext {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            new_claims: Vec::new(),
        }
    }

    pub fn with_new_claims(mut self, claims: Vec<Claim>) -> Self {
        self.new_claims = claims;
        self
    }
}

/// Newly identified defeaters and contradictions from one run.
///
/// Construction goes through [`Defeater::new`], which enforces the
/// confidence-class contract per defeater kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub defeaters: Vec<Defeater>,
    pub contradictions: Vec<Contradiction>,
}

impl DetectionResult {
    pub fn is_empty(&self) -> bool {
        self.defeaters.is_empty() && self.contradictions.is_empty()
    }
}

/// Scans the claim graph for defeaters and contradictions.
pub struct DetectionEngine {
    config: DetectionConfig,
}

impl DetectionEngine {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run all strategies over active claims plus `ctx.new_claims`.
    ///
    /// Findings already present in the graph store (same defeater id, same
    /// contradiction pair) are suppressed so repeated runs are quiet.
    pub fn detect(
        &self,
        storage: &dyn EvidenceGraphStorage,
        ctx: &DetectionContext,
    ) -> LibrarianResult<DetectionResult> {
        let mut claims = storage.get_claims(&ClaimFilter::active())?;
        let known: HashSet<_> = claims.iter().map(|c| c.id.clone()).collect();
        claims.extend(
            ctx.new_claims
                .iter()
                .filter(|c| !known.contains(&c.id))
                .cloned(),
        );

        let existing_defeaters: HashSet<String> = storage
            .get_active_defeaters()?
            .into_iter()
            .map(|d| d.id)
            .collect();
        let existing_contradictions: HashSet<String> = storage
            .get_unresolved_contradictions()?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let mut result = DetectionResult::default();

        for defeater in test_failure::detect(&claims, ctx.timestamp)? {
            if !existing_defeaters.contains(&defeater.id) {
                result.defeaters.push(defeater);
            }
        }
        for defeater in staleness::detect(&claims, ctx.timestamp, &self.config)? {
            if !existing_defeaters.contains(&defeater.id) {
                result.defeaters.push(defeater);
            }
        }
        for contradiction in direct_conflict::detect(&claims, ctx.timestamp) {
            if !existing_contradictions.contains(&contradiction.id) {
                result.contradictions.push(contradiction);
            }
        }

        debug!(
            defeaters = result.defeaters.len(),
            contradictions = result.contradictions.len(),
            scanned = claims.len(),
            "detection run complete"
        );
        Ok(result)
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

//! Structural confidence recomputation for targeted reembedding.
//!
//! When reembedding touches an entity, its confidence is recomputed from
//! what the index actually knows about it, never reset to a placeholder.
//! Six weighted signals contribute, the result is clamped to
//! `[RECOMPUTED_CONFIDENCE_MIN, RECOMPUTED_CONFIDENCE_MAX]`, and entities
//! whose recomputed value sits within `CONFIDENCE_UPDATE_EPSILON` of the
//! stored one are skipped to avoid needless writes and ledger churn.

use librarian_core::constants::{
    CONFIDENCE_UPDATE_EPSILON, RECOMPUTED_CONFIDENCE_MAX, RECOMPUTED_CONFIDENCE_MIN,
};
use librarian_core::models::EntitySignals;

// Signal weights; sum to 1.0.
const WEIGHT_PURPOSE: f64 = 0.20;
const WEIGHT_TYPES: f64 = 0.15;
const WEIGHT_EMBEDDING: f64 = 0.15;
const WEIGHT_STRUCTURE: f64 = 0.15;
const WEIGHT_USAGE: f64 = 0.15;
const WEIGHT_HISTORY: f64 = 0.20;

/// Purpose text saturates at this length.
const PURPOSE_SATURATION_LEN: usize = 200;
/// Access counts saturate at this many hits.
const USAGE_SATURATION: f64 = 100.0;

/// Recompute an entity's confidence from its structural signals.
pub fn recompute_confidence(signals: &EntitySignals) -> f64 {
    let purpose = (signals.purpose_text_len as f64 / PURPOSE_SATURATION_LEN as f64).min(1.0);
    let types = if signals.has_type_annotations { 1.0 } else { 0.0 };
    let embedding = if signals.has_embedding { 1.0 } else { 0.0 };

    let structure = match (signals.export_count > 0, signals.dependency_count > 0) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.0,
    };

    // Log-scaled so the first accesses count for more than the thousandth.
    let usage = ((1.0 + signals.access_count as f64).ln() / (1.0 + USAGE_SATURATION).ln()).min(1.0);

    let attempts = signals.success_count + signals.failure_count;
    let history = if attempts == 0 {
        // No track record yet is neutral, not damning.
        0.5
    } else {
        signals.success_count as f64 / attempts as f64
    };

    let raw = WEIGHT_PURPOSE * purpose
        + WEIGHT_TYPES * types
        + WEIGHT_EMBEDDING * embedding
        + WEIGHT_STRUCTURE * structure
        + WEIGHT_USAGE * usage
        + WEIGHT_HISTORY * history;
    raw.clamp(RECOMPUTED_CONFIDENCE_MIN, RECOMPUTED_CONFIDENCE_MAX)
}

/// The entities whose recomputed confidence differs enough from the stored
/// value to warrant a write, with the new value.
pub fn plan_confidence_updates(signals: &[EntitySignals]) -> Vec<(String, f64)> {
    signals
        .iter()
        .filter_map(|s| {
            let recomputed = recompute_confidence(s);
            if (recomputed - s.stored_confidence).abs() > CONFIDENCE_UPDATE_EPSILON {
                Some((s.entity_id.clone(), recomputed))
            } else {
                None
            }
        })
        .collect()
}

//! The defeater-ledger bridge.
//!
//! Runs detection, records findings as ledger entries, applies the
//! consequences to the claim graph, and optionally re-triggers itself when
//! new claims land in the ledger. Recording is best-effort per item: one
//! failed append never aborts the batch.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use librarian_core::config::BridgeConfig;
use librarian_core::confidence::ConfidenceValue;
use librarian_core::errors::LibrarianResult;
use librarian_core::models::{
    Claim, ClaimId, Contradiction, Defeater, DefeaterSeverity, EvidenceEntry, EvidenceFilter,
    EvidenceKind, NewEvidence, Provenance, ResolutionOutcome,
};
use librarian_core::traits::EvidenceGraphStorage;
use librarian_ledger::{EvidenceLedger, SubscriptionHandle};

use crate::detection::{DetectionContext, DetectionEngine, DetectionResult};
use crate::history::{self, ReconstructedContradiction, ReconstructedDefeater};

/// `provenance.method` for detection entries.
pub const METHOD_DETECTION: &str = "defeater_detection";
/// `provenance.method` for resolution entries.
pub const METHOD_RESOLUTION: &str = "defeater_resolution";

const DETECTION_SOURCE: &str = "defeater_ledger_bridge";

/// One `detect_and_record` call: unique id, what ran, what got recorded.
#[derive(Debug, Clone)]
pub struct DetectionRecord {
    pub detection_id: String,
    pub timestamp: DateTime<Utc>,
    pub context: DetectionContext,
    pub result: Arc<DetectionResult>,
    /// Per-item recording failures; the batch always runs to completion.
    pub errors: Vec<String>,
}

/// One application pass over a detection result.
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    pub application_id: String,
    /// Shares the [`DetectionRecord`]'s result, so detection and
    /// application can never diverge.
    pub detection_result: Arc<DetectionResult>,
    pub claims_updated: Vec<ClaimId>,
    pub errors: Vec<String>,
}

/// Combined outcome of `detect_and_apply`.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub detection: DetectionRecord,
    pub application: ApplicationRecord,
}

/// Bridges the detection engine and the evidence ledger.
pub struct DefeaterLedgerBridge {
    ledger: Arc<EvidenceLedger>,
    storage: Arc<dyn EvidenceGraphStorage>,
    engine: DetectionEngine,
    config: BridgeConfig,
    /// `Some` while auto-detection is on. Guards idempotent start/stop.
    auto_subscription: Mutex<Option<SubscriptionHandle>>,
}

impl DefeaterLedgerBridge {
    pub fn new(
        ledger: Arc<EvidenceLedger>,
        storage: Arc<dyn EvidenceGraphStorage>,
        engine: DetectionEngine,
        config: BridgeConfig,
    ) -> Self {
        Self {
            ledger,
            storage,
            engine,
            config,
            auto_subscription: Mutex::new(None),
        }
    }

    /// Run detection and record findings in the ledger.
    ///
    /// Defeaters below `minimum_record_severity` are detected but not
    /// recorded. Every call gets a distinct `detection_id`, including
    /// concurrent calls.
    pub fn detect_and_record(&self, context: DetectionContext) -> LibrarianResult<DetectionRecord> {
        let detection_id = Uuid::new_v4().to_string();
        let timestamp = Utc::now();
        let result = Arc::new(self.engine.detect(self.storage.as_ref(), &context)?);
        let mut errors = Vec::new();

        for defeater in &result.defeaters {
            if defeater.severity < self.config.minimum_record_severity {
                continue;
            }
            if let Err(e) = self.record_defeater(defeater, &detection_id) {
                errors.push(format!("recording defeater {}: {e}", defeater.id));
            }
        }
        for contradiction in &result.contradictions {
            if let Err(e) = self.record_contradiction(contradiction, &detection_id) {
                errors.push(format!("recording contradiction {}: {e}", contradiction.id));
            }
        }

        info!(
            detection_id = %detection_id,
            defeaters = result.defeaters.len(),
            contradictions = result.contradictions.len(),
            record_errors = errors.len(),
            "detection recorded"
        );
        Ok(DetectionRecord {
            detection_id,
            timestamp,
            context,
            result,
            errors,
        })
    }

    fn record_defeater(&self, defeater: &Defeater, detection_id: &str) -> LibrarianResult<()> {
        let payload = json!({
            "defeater_id": defeater.id,
            "defeater_type": defeater.kind.to_string(),
            "severity": defeater.severity.to_string(),
            "affected_claims": defeater
                .affected_claims
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>(),
            "details": defeater.details,
            "detection_id": detection_id,
        });
        self.ledger.append(
            NewEvidence::new(
                EvidenceKind::Verification,
                payload,
                Provenance::new(DETECTION_SOURCE, METHOD_DETECTION),
            )
            .with_confidence(defeater.confidence.clone()),
        )?;
        Ok(())
    }

    fn record_contradiction(
        &self,
        contradiction: &Contradiction,
        detection_id: &str,
    ) -> LibrarianResult<()> {
        let payload = json!({
            "contradiction_id": contradiction.id,
            "claim_a": contradiction.claim_a.as_str(),
            "claim_b": contradiction.claim_b.as_str(),
            "contradiction_type": contradiction.contradiction_type.name(),
            "explanation": contradiction.explanation,
            "severity": contradiction.severity.to_string(),
            "detection_id": detection_id,
        });
        self.ledger.append(NewEvidence::new(
            EvidenceKind::Contradiction,
            payload,
            Provenance::new(DETECTION_SOURCE, METHOD_DETECTION),
        ))?;
        Ok(())
    }

    /// Detect, record, then apply consequences to the claim graph.
    ///
    /// The application works off the exact result object the detection
    /// produced (`Arc`-shared), so the two can never diverge.
    pub fn detect_and_apply(&self, context: DetectionContext) -> LibrarianResult<ApplyOutcome> {
        let detection = self.detect_and_record(context)?;
        let application_id = Uuid::new_v4().to_string();
        let result = Arc::clone(&detection.result);
        let mut claims_updated = Vec::new();
        let mut errors = Vec::new();

        for defeater in &result.defeaters {
            if let Err(e) = self.storage.insert_defeater(defeater) {
                errors.push(format!("inserting defeater {}: {e}", defeater.id));
                continue;
            }
            for claim_id in &defeater.affected_claims {
                match self.apply_to_claim(defeater, claim_id) {
                    Ok(()) => claims_updated.push(claim_id.clone()),
                    Err(e) => errors.push(format!("applying to claim {claim_id}: {e}")),
                }
            }
        }
        for contradiction in &result.contradictions {
            if let Err(e) = self.storage.insert_contradiction(contradiction) {
                errors.push(format!("inserting contradiction {}: {e}", contradiction.id));
            }
        }

        Ok(ApplyOutcome {
            detection,
            application: ApplicationRecord {
                application_id,
                detection_result: result,
                claims_updated,
                errors,
            },
        })
    }

    /// Full-severity defeat flips the claim's status; weaker defeaters
    /// erode its confidence through the algebra, keeping provenance.
    fn apply_to_claim(&self, defeater: &Defeater, claim_id: &ClaimId) -> LibrarianResult<()> {
        if defeater.severity == DefeaterSeverity::Full {
            return self
                .storage
                .update_claim_status(claim_id, librarian_core::models::ClaimStatus::Defeated);
        }
        let Some(claim) = self.storage.get_claim(claim_id)? else {
            return Err(librarian_core::errors::LibrarianError::not_found(
                "claim",
                claim_id.as_str(),
            ));
        };
        let survival = 1.0 - defeater.confidence.effective().unwrap_or(0.0);
        let eroded = claim.confidence.and_combine(&ConfidenceValue::measured(
            survival.clamp(0.0, 1.0),
            format!("survival vs defeater {}", defeater.id),
        )?);
        self.storage.update_claim_confidence(claim_id, eroded)
    }

    /// Begin auto-detection: every claim-kind ledger entry triggers a
    /// detached `detect_and_apply` run. No-op when already detecting.
    pub fn start_auto_detection(self: &Arc<Self>) {
        let mut slot = self.auto_subscription.lock().expect("bridge lock poisoned");
        if slot.is_some() {
            return;
        }
        let bridge = Arc::clone(self);
        let handle = self.ledger.subscribe(
            EvidenceFilter::by_kind(EvidenceKind::Claim),
            move |entry| {
                // Malformed payloads must not panic out of the ledger's
                // dispatch path.
                let claim: Claim = match serde_json::from_value(entry.payload.clone()) {
                    Ok(claim) => claim,
                    Err(e) => {
                        warn!(entry = %entry.id, error = %e, "claim payload not parseable, skipping auto-detection");
                        return;
                    }
                };
                let bridge = Arc::clone(&bridge);
                // Detached so detection latency and failures never reach
                // the appender.
                std::thread::spawn(move || {
                    let context = DetectionContext::at(Utc::now()).with_new_claims(vec![claim]);
                    if let Err(e) = bridge.detect_and_apply(context) {
                        warn!(error = %e, "auto-detection run failed");
                    }
                });
            },
        );
        *slot = Some(handle);
        info!("auto-detection started");
    }

    /// Stop auto-detection. No-op when already idle.
    pub fn stop_auto_detection(&self) {
        let mut slot = self.auto_subscription.lock().expect("bridge lock poisoned");
        if let Some(handle) = slot.take() {
            handle.unsubscribe();
            info!("auto-detection stopped");
        }
    }

    pub fn is_auto_detecting(&self) -> bool {
        self.auto_subscription
            .lock()
            .expect("bridge lock poisoned")
            .is_some()
    }

    /// Defeater ids for which a resolution entry exists.
    fn resolved_defeater_ids(&self) -> LibrarianResult<HashSet<String>> {
        Ok(self
            .ledger
            .query(
                &EvidenceFilter::by_kind(EvidenceKind::Verification)
                    .with_method(METHOD_RESOLUTION),
            )?
            .iter()
            .filter_map(|e| e.payload.get("defeater_id"))
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect())
    }

    /// Defeater detections reconstructed from the ledger, oldest first.
    pub fn get_defeater_history(
        &self,
        limit: Option<usize>,
    ) -> LibrarianResult<Vec<ReconstructedDefeater>> {
        let resolved = self.resolved_defeater_ids()?;
        let mut filter =
            EvidenceFilter::by_kind(EvidenceKind::Verification).with_method(METHOD_DETECTION);
        filter.limit = limit;
        Ok(self
            .ledger
            .query(&filter)?
            .iter()
            .filter_map(|entry| {
                history::defeater_from_entry(entry, {
                    entry
                        .payload
                        .get("defeater_id")
                        .and_then(|v| v.as_str())
                        .is_some_and(|id| resolved.contains(id))
                })
            })
            .collect())
    }

    /// Contradiction detections reconstructed from the ledger.
    pub fn get_contradiction_history(
        &self,
        limit: Option<usize>,
    ) -> LibrarianResult<Vec<ReconstructedContradiction>> {
        let mut filter = EvidenceFilter::by_kind(EvidenceKind::Contradiction);
        filter.limit = limit;
        Ok(self
            .ledger
            .query(&filter)?
            .iter()
            .filter_map(history::contradiction_from_entry)
            .collect())
    }

    /// Recorded defeaters with no resolution entry, deduplicated by id
    /// (latest detection wins).
    pub fn get_active_defeaters(&self) -> LibrarianResult<Vec<ReconstructedDefeater>> {
        let mut latest: Vec<ReconstructedDefeater> = Vec::new();
        for defeater in self.get_defeater_history(None)? {
            if defeater.status != librarian_core::models::DefeaterStatus::Active {
                continue;
            }
            if let Some(existing) = latest
                .iter_mut()
                .find(|d| d.defeater_id == defeater.defeater_id)
            {
                *existing = defeater;
            } else {
                latest.push(defeater);
            }
        }
        Ok(latest)
    }

    /// Recorded contradictions; the ledger only records detections, so these
    /// are all unresolved.
    pub fn get_unresolved_contradictions(&self) -> LibrarianResult<Vec<ReconstructedContradiction>> {
        self.get_contradiction_history(None)
    }

    /// Record the resolution of a recorded defeater as a new append-only
    /// fact. The original detection entry is never touched.
    pub fn resolve_defeater(
        &self,
        defeater_id: &str,
        outcome: ResolutionOutcome,
    ) -> LibrarianResult<EvidenceEntry> {
        let detection_entry = self
            .ledger
            .query(
                &EvidenceFilter::by_kind(EvidenceKind::Verification)
                    .with_method(METHOD_DETECTION),
            )?
            .into_iter()
            .find(|e| {
                e.payload.get("defeater_id").and_then(|v| v.as_str()) == Some(defeater_id)
            })
            .ok_or_else(|| {
                librarian_core::errors::LibrarianError::not_found("defeater", defeater_id)
            })?;

        let payload = json!({
            "defeater_id": defeater_id,
            "outcome": match outcome {
                ResolutionOutcome::Accepted => "accepted",
                ResolutionOutcome::Invalidated => "invalidated",
                ResolutionOutcome::Addressed => "addressed",
            },
            "result": outcome.as_result(),
        });
        self.ledger.append(
            NewEvidence::new(
                EvidenceKind::Verification,
                payload,
                Provenance::new(DETECTION_SOURCE, METHOD_RESOLUTION),
            )
            .with_related(vec![detection_entry.id]),
        )
    }
}

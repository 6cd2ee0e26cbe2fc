use dashmap::DashMap;

use librarian_core::confidence::ConfidenceValue;
use librarian_core::errors::{LibrarianError, LibrarianResult};
use librarian_core::models::{
    Claim, ClaimFilter, ClaimId, ClaimStatus, Contradiction, ContradictionStatus, Defeater,
    DefeaterStatus,
};
use librarian_core::traits::EvidenceGraphStorage;

/// Thread-safe in-memory claim/defeater/contradiction store.
///
/// Claims are never removed; status and confidence updates are the only
/// mutations, matching the graph-storage contract.
#[derive(Default)]
pub struct MemoryGraphStore {
    claims: DashMap<ClaimId, Claim>,
    defeaters: DashMap<String, Defeater>,
    contradictions: DashMap<String, Contradiction>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a claim. Insertion is not part of the core contract (claims come
    /// from extraction, which is out of scope) but backends need a way in.
    pub fn insert_claim(&self, claim: Claim) {
        self.claims.insert(claim.id.clone(), claim);
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    pub fn resolve_defeater(&self, id: &str) -> LibrarianResult<()> {
        let mut defeater = self
            .defeaters
            .get_mut(id)
            .ok_or_else(|| LibrarianError::not_found("defeater", id))?;
        defeater.status = DefeaterStatus::Resolved;
        Ok(())
    }
}

impl EvidenceGraphStorage for MemoryGraphStore {
    fn get_claim(&self, id: &ClaimId) -> LibrarianResult<Option<Claim>> {
        Ok(self.claims.get(id).map(|c| c.clone()))
    }

    fn get_claims(&self, filter: &ClaimFilter) -> LibrarianResult<Vec<Claim>> {
        let mut claims: Vec<Claim> = self
            .claims
            .iter()
            .filter(|c| filter.matches(c))
            .map(|c| c.clone())
            .collect();
        claims.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(claims)
    }

    fn get_all_claims(&self) -> LibrarianResult<Vec<Claim>> {
        self.get_claims(&ClaimFilter::default())
    }

    fn get_active_defeaters(&self) -> LibrarianResult<Vec<Defeater>> {
        let mut defeaters: Vec<Defeater> = self
            .defeaters
            .iter()
            .filter(|d| d.status == DefeaterStatus::Active)
            .map(|d| d.clone())
            .collect();
        defeaters.sort_by(|a, b| a.detected_at.cmp(&b.detected_at));
        Ok(defeaters)
    }

    fn get_unresolved_contradictions(&self) -> LibrarianResult<Vec<Contradiction>> {
        let mut contradictions: Vec<Contradiction> = self
            .contradictions
            .iter()
            .filter(|c| c.status == ContradictionStatus::Unresolved)
            .map(|c| c.clone())
            .collect();
        contradictions.sort_by(|a, b| a.detected_at.cmp(&b.detected_at));
        Ok(contradictions)
    }

    fn update_claim_confidence(
        &self,
        id: &ClaimId,
        confidence: ConfidenceValue,
    ) -> LibrarianResult<()> {
        let mut claim = self
            .claims
            .get_mut(id)
            .ok_or_else(|| LibrarianError::not_found("claim", id.as_str()))?;
        claim.confidence = confidence;
        Ok(())
    }

    fn update_claim_status(&self, id: &ClaimId, status: ClaimStatus) -> LibrarianResult<()> {
        let mut claim = self
            .claims
            .get_mut(id)
            .ok_or_else(|| LibrarianError::not_found("claim", id.as_str()))?;
        claim.status = status;
        Ok(())
    }

    fn insert_defeater(&self, defeater: &Defeater) -> LibrarianResult<()> {
        self.defeaters
            .insert(defeater.id.clone(), defeater.clone());
        Ok(())
    }

    fn insert_contradiction(&self, contradiction: &Contradiction) -> LibrarianResult<()> {
        self.contradictions
            .insert(contradiction.id.clone(), contradiction.clone());
        Ok(())
    }

    fn activate_defeater(&self, id: &str) -> LibrarianResult<()> {
        let mut defeater = self
            .defeaters
            .get_mut(id)
            .ok_or_else(|| LibrarianError::not_found("defeater", id))?;
        defeater.status = DefeaterStatus::Active;
        Ok(())
    }
}

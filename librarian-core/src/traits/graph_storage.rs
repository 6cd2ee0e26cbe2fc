use crate::confidence::ConfidenceValue;
use crate::errors::LibrarianResult;
use crate::models::{
    Claim, ClaimFilter, ClaimId, ClaimStatus, Contradiction, Defeater,
};

/// The minimal claim/defeater/contradiction storage the epistemics core
/// requires. Detection and the bridge are written purely against this trait
/// so any backend (in-memory, relational, embedded) can satisfy it.
///
/// All mutation is narrowly scoped — status and confidence updates, inserts,
/// activation — never broad rewrites, so concurrent readers stay consistent.
pub trait EvidenceGraphStorage: Send + Sync {
    fn get_claim(&self, id: &ClaimId) -> LibrarianResult<Option<Claim>>;
    fn get_claims(&self, filter: &ClaimFilter) -> LibrarianResult<Vec<Claim>>;
    fn get_all_claims(&self) -> LibrarianResult<Vec<Claim>>;

    fn get_active_defeaters(&self) -> LibrarianResult<Vec<Defeater>>;
    fn get_unresolved_contradictions(&self) -> LibrarianResult<Vec<Contradiction>>;

    fn update_claim_confidence(
        &self,
        id: &ClaimId,
        confidence: ConfidenceValue,
    ) -> LibrarianResult<()>;
    fn update_claim_status(&self, id: &ClaimId, status: ClaimStatus) -> LibrarianResult<()>;

    fn insert_defeater(&self, defeater: &Defeater) -> LibrarianResult<()>;
    fn insert_contradiction(&self, contradiction: &Contradiction) -> LibrarianResult<()>;
    fn activate_defeater(&self, id: &str) -> LibrarianResult<()>;
}

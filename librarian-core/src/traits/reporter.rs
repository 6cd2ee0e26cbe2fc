use crate::errors::LibrarianResult;
use crate::models::LibrarianStateReport;
use crate::traits::EvidenceGraphStorage;

/// External health/metrics collaborator. The recovery controller asks it
/// for a fresh snapshot before diagnosing and again after acting.
pub trait StateReporter: Send + Sync {
    fn generate_state_report(
        &self,
        storage: &dyn EvidenceGraphStorage,
    ) -> LibrarianResult<LibrarianStateReport>;
}

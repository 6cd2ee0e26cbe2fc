use crate::errors::LibrarianResult;
use crate::models::{ActionExecution, RecoveryActionKind};
use crate::traits::EvidenceGraphStorage;

/// Bounds an executor must respect for one action run.
#[derive(Debug, Clone)]
pub struct ActionLimits {
    pub max_entities: usize,
    pub max_files: usize,
    /// Human-readable reason carried from the diagnosis, for audit logs.
    pub reason: String,
}

/// Pluggable per-action-kind execution. The controller plans and budgets;
/// executors do the actual reindexing/warming/resolving work.
pub trait RecoveryActionExecutor: Send + Sync {
    fn execute_action(
        &self,
        storage: &dyn EvidenceGraphStorage,
        action: RecoveryActionKind,
        limits: &ActionLimits,
    ) -> LibrarianResult<ActionExecution>;
}

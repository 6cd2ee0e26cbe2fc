pub mod executor;
pub mod graph_storage;
pub mod reporter;
pub mod state_store;

pub use executor::{ActionLimits, RecoveryActionExecutor};
pub use graph_storage::EvidenceGraphStorage;
pub use reporter::StateReporter;
pub use state_store::StateStore;

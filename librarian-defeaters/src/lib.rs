//! # librarian-defeaters
//!
//! Detects evidence that undermines claims (defeaters) and contradictions
//! between claims, and bridges those findings into the evidence ledger.
//! The ledger is the source of truth for detection history; the graph store
//! only mirrors current state.

pub mod bridge;
pub mod detection;
pub mod history;

pub use bridge::{ApplicationRecord, ApplyOutcome, DefeaterLedgerBridge, DetectionRecord};
pub use detection::{DetectionContext, DetectionEngine, DetectionResult};
pub use history::{ReconstructedContradiction, ReconstructedDefeater};

//! # librarian-core
//!
//! Foundation crate for the Librarian epistemics engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod confidence;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use confidence::{BoundsBasis, CalibrationStatus, ConfidenceClass, ConfidenceValue};
pub use config::LibrarianConfig;
pub use errors::{LibrarianError, LibrarianResult};
pub use models::{Claim, ClaimId, ClaimStatus, Contradiction, Defeater, EvidenceEntry};

pub mod calibration;
pub mod claim;
pub mod contradiction;
pub mod defeater;
pub mod evidence;
pub mod recovery;
pub mod state_report;

pub use calibration::{
    CalibrationAdjustment, CalibrationBucket, CalibrationCurve, CalibrationReport,
    CalibrationSample,
};
pub use claim::{Claim, ClaimFilter, ClaimId, ClaimSource, ClaimStatus, ClaimSubject, ClaimType};
pub use contradiction::{Contradiction, ContradictionStatus, ContradictionType};
pub use defeater::{Defeater, DefeaterKind, DefeaterSeverity, DefeaterStatus, ResolutionOutcome};
pub use evidence::{
    EvidenceChain, EvidenceEntry, EvidenceFilter, EvidenceId, EvidenceKind, NewEvidence,
    Provenance,
};
pub use recovery::{
    ActionExecution, DegradationDiagnosis, DegradationSeverity, DegradationType, EntitySignals,
    RecoveryAction, RecoveryActionKind, RecoveryBudget, RecoveryResult, RecoveryState,
    RecoveryStatus, ResourceUsage,
};
pub use state_report::{
    CodeGraphHealth, ConfidenceState, IndexFreshness, LibrarianStateReport, QueryPerformance,
};

//! # librarian-recovery
//!
//! Closed-loop recovery: diagnose degradation against SLO thresholds, plan
//! corrective actions inside an hourly resource budget, execute them through
//! injected executors, and track an explicit recovery state machine.
//!
//! Budget exhaustion and cooldown gates are operational outcomes, not
//! errors: callers get a structured `RecoveryResult` with `success: false`
//! and a reason, never an `Err`.

pub mod budget;
pub mod controller;
pub mod diagnosis;
pub mod planning;
pub mod reembedding;

pub use budget::UsageWindow;
pub use controller::{RecoveryController, NO_ACTION_NEEDED};
pub use diagnosis::diagnose_degradation;
pub use planning::plan_recovery_actions;
pub use reembedding::{plan_confidence_updates, recompute_confidence};

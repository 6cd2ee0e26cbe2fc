/// Floor that evidence decay approaches but never crosses downward.
/// Old evidence stays faintly relevant rather than vanishing.
pub const DECAY_FLOOR: f64 = 0.05;

/// Minimum change in recomputed confidence before an entity is rewritten.
/// Smaller deltas are noise and would only churn the ledger.
pub const CONFIDENCE_UPDATE_EPSILON: f64 = 0.01;

/// Clamp range for structurally recomputed confidence.
pub const RECOMPUTED_CONFIDENCE_MIN: f64 = 0.1;
pub const RECOMPUTED_CONFIDENCE_MAX: f64 = 0.95;

/// A metric breaching its SLO bound by this factor escalates severity a tier.
pub const SEVERITY_ESCALATION_FACTOR: f64 = 2.0;

/// Rolling budget window length.
pub const BUDGET_WINDOW_SECS: i64 = 3600;

/// Claims unverified for longer than this are candidates for staleness
/// defeaters.
pub const DEFAULT_STALENESS_THRESHOLD_DAYS: i64 = 30;

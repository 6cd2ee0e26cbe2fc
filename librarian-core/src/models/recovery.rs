use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recovery controller state. Transitions are computed from fresh health
/// assessments, never set directly from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryState {
    Healthy,
    Degraded,
    Diagnosing,
    Recovering,
    /// Recovery ran and health did not come back. Stop spending budget.
    DegradedStable,
}

/// Hourly resource ceilings plus post-recovery cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryBudget {
    pub max_tokens_per_hour: u64,
    pub max_embeddings_per_hour: u64,
    pub max_reindex_files_per_hour: u64,
    pub cooldown_after_recovery_minutes: i64,
}

impl Default for RecoveryBudget {
    fn default() -> Self {
        Self {
            max_tokens_per_hour: 200_000,
            max_embeddings_per_hour: 2_000,
            max_reindex_files_per_hour: 500,
            cooldown_after_recovery_minutes: 30,
        }
    }
}

/// Consumption across the three budgeted dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub tokens: u64,
    pub embeddings: u64,
    pub files: u64,
}

impl ResourceUsage {
    pub fn new(tokens: u64, embeddings: u64, files: u64) -> Self {
        Self {
            tokens,
            embeddings,
            files,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self {
            tokens: self.tokens.saturating_add(other.tokens),
            embeddings: self.embeddings.saturating_add(other.embeddings),
            files: self.files.saturating_add(other.files),
        }
    }

    /// True when every dimension fits inside `remaining` simultaneously.
    pub fn fits_within(&self, remaining: &Self) -> bool {
        self.tokens <= remaining.tokens
            && self.embeddings <= remaining.embeddings
            && self.files <= remaining.files
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationType {
    StaleIndex,
    LowConfidence,
    HighDefeaterCount,
    QuerySlowdown,
    CoverageDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// One breached SLO with enough context to act on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationDiagnosis {
    pub degradation_type: DegradationType,
    pub severity: DegradationSeverity,
    pub metric: String,
    pub current_value: f64,
    pub threshold: f64,
    pub recommendation: String,
}

/// Corrective action kinds, one per degradation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryActionKind {
    FullRescan,
    IncrementalReindex,
    TargetedReembedding,
    DefeaterResolution,
    CacheWarmup,
}

impl RecoveryActionKind {
    /// Execution priority; lower runs first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::FullRescan => 0,
            Self::IncrementalReindex => 1,
            Self::TargetedReembedding => 2,
            Self::DefeaterResolution => 3,
            Self::CacheWarmup => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FullRescan => "full_rescan",
            Self::IncrementalReindex => "incremental_reindex",
            Self::TargetedReembedding => "targeted_reembedding",
            Self::DefeaterResolution => "defeater_resolution",
            Self::CacheWarmup => "cache_warmup",
        }
    }
}

/// A planned, budget-checked corrective action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryAction {
    pub kind: RecoveryActionKind,
    pub priority: u8,
    pub reason: String,
    pub estimated_cost: ResourceUsage,
    pub max_entities: usize,
    pub max_files: usize,
}

/// What an injected executor reports back for one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExecution {
    pub success: bool,
    pub entities_affected: usize,
    pub errors: Vec<String>,
    pub fitness_deltas: HashMap<String, f64>,
    pub duration_ms: u64,
    pub usage: ResourceUsage,
}

/// Result of one `execute_recovery` call. Operational rejections (cooldown,
/// in-flight) come back here with `success: false`, never as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryResult {
    pub success: bool,
    pub reason: Option<String>,
    pub actions_executed: Vec<String>,
    pub errors: Vec<String>,
    pub usage: ResourceUsage,
    pub state: RecoveryState,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RecoveryResult {
    pub fn rejected(reason: impl Into<String>, state: RecoveryState) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            actions_executed: Vec::new(),
            errors: Vec::new(),
            usage: ResourceUsage::default(),
            state,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }
}

/// Introspection snapshot of the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryStatus {
    pub state: RecoveryState,
    pub in_flight: bool,
    pub last_recovery_time: Option<DateTime<Utc>>,
    pub cooldown_remaining_minutes: i64,
    pub remaining_budget: ResourceUsage,
}

/// Structural signals used to recompute an entity's confidence during
/// targeted reembedding, instead of resetting to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySignals {
    pub entity_id: String,
    pub purpose_text_len: usize,
    pub has_type_annotations: bool,
    pub has_embedding: bool,
    pub export_count: usize,
    pub dependency_count: usize,
    pub access_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub stored_confidence: f64,
}

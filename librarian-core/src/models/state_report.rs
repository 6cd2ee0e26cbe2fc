use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How current the index is relative to the codebase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFreshness {
    pub last_full_index: Option<DateTime<Utc>>,
    pub hours_since_index: f64,
    /// Fraction of indexed entities whose source changed since indexing.
    pub stale_entity_ratio: f64,
}

/// Aggregate epistemic state of the claim graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceState {
    /// Geometric mean of effective confidence over active claims.
    pub geometric_mean_confidence: f64,
    pub low_confidence_count: usize,
    pub active_defeater_count: usize,
    pub unresolved_contradiction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPerformance {
    pub p50_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub recent_query_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeGraphHealth {
    pub indexed_entity_count: usize,
    pub total_entity_count: usize,
    /// indexed / total; 1.0 when total is zero.
    pub coverage_ratio: f64,
    pub dangling_edge_count: usize,
}

/// Health snapshot the recovery controller diagnoses from. Produced by an
/// external metrics collaborator, never by the controller itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarianStateReport {
    pub generated_at: DateTime<Utc>,
    pub index_freshness: IndexFreshness,
    pub confidence_state: ConfidenceState,
    pub query_performance: QueryPerformance,
    pub code_graph_health: CodeGraphHealth,
}

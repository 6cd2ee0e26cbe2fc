//! SLO evaluation over a state report.
//!
//! Each check produces a diagnosis only when its threshold is breached.
//! Severity is tiered by how far past the bound the metric sits: a breach
//! starts at medium, escalates to high at `SEVERITY_ESCALATION_FACTOR`
//! times the bound, and to critical at the factor squared.

use tracing::warn;

use librarian_core::config::SloThresholds;
use librarian_core::constants::SEVERITY_ESCALATION_FACTOR;
use librarian_core::models::{
    DegradationDiagnosis, DegradationSeverity, DegradationType, LibrarianStateReport,
};

/// How many times over the bound a metric is. For ceilings this is
/// `current / threshold`; for floors, `threshold / current`.
fn breach_ratio(current: f64, threshold: f64, is_floor: bool) -> f64 {
    if is_floor {
        if current <= 0.0 {
            return f64::INFINITY;
        }
        threshold / current
    } else {
        if threshold <= 0.0 {
            return f64::INFINITY;
        }
        current / threshold
    }
}

fn severity_for(ratio: f64) -> DegradationSeverity {
    if ratio >= SEVERITY_ESCALATION_FACTOR * SEVERITY_ESCALATION_FACTOR {
        DegradationSeverity::Critical
    } else if ratio >= SEVERITY_ESCALATION_FACTOR {
        DegradationSeverity::High
    } else {
        DegradationSeverity::Medium
    }
}

struct SloCheck {
    degradation_type: DegradationType,
    metric: &'static str,
    current: f64,
    threshold: f64,
    is_floor: bool,
    recommendation: &'static str,
}

impl SloCheck {
    fn breached(&self) -> bool {
        if self.is_floor {
            self.current < self.threshold
        } else {
            self.current > self.threshold
        }
    }

    fn diagnose(&self) -> DegradationDiagnosis {
        let ratio = breach_ratio(self.current, self.threshold, self.is_floor);
        DegradationDiagnosis {
            degradation_type: self.degradation_type,
            severity: severity_for(ratio),
            metric: self.metric.to_string(),
            current_value: self.current,
            threshold: self.threshold,
            recommendation: self.recommendation.to_string(),
        }
    }
}

/// Evaluate every SLO against the report and return the breaches.
pub fn diagnose_degradation(
    report: &LibrarianStateReport,
    slo: &SloThresholds,
) -> Vec<DegradationDiagnosis> {
    let checks = [
        SloCheck {
            degradation_type: DegradationType::StaleIndex,
            metric: "hours_since_index",
            current: report.index_freshness.hours_since_index,
            threshold: slo.max_index_age_hours,
            is_floor: false,
            recommendation: "run an incremental reindex of changed files",
        },
        SloCheck {
            degradation_type: DegradationType::LowConfidence,
            metric: "geometric_mean_confidence",
            current: report.confidence_state.geometric_mean_confidence,
            threshold: slo.min_geometric_mean_confidence,
            is_floor: true,
            recommendation: "recompute entity confidence from structural signals",
        },
        SloCheck {
            degradation_type: DegradationType::HighDefeaterCount,
            metric: "active_defeater_count",
            current: report.confidence_state.active_defeater_count as f64,
            threshold: slo.max_active_defeaters as f64,
            is_floor: false,
            recommendation: "resolve or re-verify claims with active defeaters",
        },
        SloCheck {
            degradation_type: DegradationType::QuerySlowdown,
            metric: "p99_latency_ms",
            current: report.query_performance.p99_latency_ms,
            threshold: slo.max_p99_latency_ms,
            is_floor: false,
            recommendation: "warm hot-path caches",
        },
        SloCheck {
            degradation_type: DegradationType::CoverageDrop,
            metric: "coverage_ratio",
            current: report.code_graph_health.coverage_ratio,
            threshold: slo.min_coverage_ratio,
            is_floor: true,
            recommendation: "rescan the codebase to restore index coverage",
        },
    ];

    let diagnoses: Vec<DegradationDiagnosis> = checks
        .iter()
        .filter(|c| c.breached())
        .map(SloCheck::diagnose)
        .collect();
    for diagnosis in &diagnoses {
        warn!(
            degradation = ?diagnosis.degradation_type,
            severity = ?diagnosis.severity,
            metric = %diagnosis.metric,
            current = diagnosis.current_value,
            threshold = diagnosis.threshold,
            "SLO breached"
        );
    }
    diagnoses
}

//! Mapping diagnoses to budget-checked recovery actions.

use tracing::debug;

use librarian_core::models::{
    DegradationDiagnosis, DegradationSeverity, DegradationType, RecoveryAction,
    RecoveryActionKind, ResourceUsage,
};

/// One action kind per degradation type.
fn action_kind_for(degradation: DegradationType) -> RecoveryActionKind {
    match degradation {
        DegradationType::CoverageDrop => RecoveryActionKind::FullRescan,
        DegradationType::StaleIndex => RecoveryActionKind::IncrementalReindex,
        DegradationType::LowConfidence => RecoveryActionKind::TargetedReembedding,
        DegradationType::HighDefeaterCount => RecoveryActionKind::DefeaterResolution,
        DegradationType::QuerySlowdown => RecoveryActionKind::CacheWarmup,
    }
}

/// Estimated per-run cost of each action kind. Deliberately coarse; the
/// executor reports actual usage afterwards.
fn estimated_cost(kind: RecoveryActionKind) -> ResourceUsage {
    match kind {
        RecoveryActionKind::FullRescan => ResourceUsage::new(50_000, 500, 200),
        RecoveryActionKind::IncrementalReindex => ResourceUsage::new(20_000, 200, 100),
        RecoveryActionKind::TargetedReembedding => ResourceUsage::new(10_000, 300, 0),
        RecoveryActionKind::DefeaterResolution => ResourceUsage::new(15_000, 0, 0),
        RecoveryActionKind::CacheWarmup => ResourceUsage::new(2_000, 0, 0),
    }
}

/// Larger entity/file caps for worse degradation.
fn limits_for(kind: RecoveryActionKind, severity: DegradationSeverity) -> (usize, usize) {
    let scale = match severity {
        DegradationSeverity::Low => 1,
        DegradationSeverity::Medium => 2,
        DegradationSeverity::High => 4,
        DegradationSeverity::Critical => 8,
    };
    match kind {
        RecoveryActionKind::FullRescan => (500 * scale, 200 * scale),
        RecoveryActionKind::IncrementalReindex => (250 * scale, 100 * scale),
        RecoveryActionKind::TargetedReembedding => (100 * scale, 0),
        RecoveryActionKind::DefeaterResolution => (50 * scale, 0),
        RecoveryActionKind::CacheWarmup => (1_000, 0),
    }
}

/// Plan actions for the given diagnoses inside the remaining budget.
///
/// Each diagnosis maps to exactly one action. Planning walks diagnoses in
/// priority order and includes an action only when its estimated cost still
/// fits what is left after the actions already planned, in all three
/// dimensions at once. The result is sorted ascending by priority.
pub fn plan_recovery_actions(
    diagnoses: &[DegradationDiagnosis],
    remaining_budget: &ResourceUsage,
) -> Vec<RecoveryAction> {
    let mut candidates: Vec<(&DegradationDiagnosis, RecoveryActionKind)> = diagnoses
        .iter()
        .map(|d| (d, action_kind_for(d.degradation_type)))
        .collect();
    candidates.sort_by_key(|(_, kind)| kind.priority());
    candidates.dedup_by_key(|(_, kind)| *kind);

    let mut remaining = *remaining_budget;
    let mut actions = Vec::new();
    for (diagnosis, kind) in candidates {
        let cost = estimated_cost(kind);
        if !cost.fits_within(&remaining) {
            debug!(action = kind.name(), "skipped: estimated cost exceeds remaining budget");
            continue;
        }
        remaining = ResourceUsage {
            tokens: remaining.tokens - cost.tokens,
            embeddings: remaining.embeddings - cost.embeddings,
            files: remaining.files - cost.files,
        };
        let (max_entities, max_files) = limits_for(kind, diagnosis.severity);
        actions.push(RecoveryAction {
            kind,
            priority: kind.priority(),
            reason: format!(
                "{}: {} at {:.3} against bound {:.3}",
                diagnosis.recommendation, diagnosis.metric, diagnosis.current_value,
                diagnosis.threshold
            ),
            estimated_cost: cost,
            max_entities,
            max_files,
        });
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnosis(degradation_type: DegradationType, severity: DegradationSeverity) -> DegradationDiagnosis {
        DegradationDiagnosis {
            degradation_type,
            severity,
            metric: "m".to_string(),
            current_value: 1.0,
            threshold: 0.5,
            recommendation: "fix it".to_string(),
        }
    }

    fn ample() -> ResourceUsage {
        ResourceUsage::new(1_000_000, 10_000, 5_000)
    }

    #[test]
    fn coverage_drop_always_plans_before_stale_index() {
        let forward = plan_recovery_actions(
            &[
                diagnosis(DegradationType::StaleIndex, DegradationSeverity::Medium),
                diagnosis(DegradationType::CoverageDrop, DegradationSeverity::Medium),
            ],
            &ample(),
        );
        let reverse = plan_recovery_actions(
            &[
                diagnosis(DegradationType::CoverageDrop, DegradationSeverity::Medium),
                diagnosis(DegradationType::StaleIndex, DegradationSeverity::Medium),
            ],
            &ample(),
        );
        for plan in [&forward, &reverse] {
            assert_eq!(plan[0].kind, RecoveryActionKind::FullRescan);
            assert_eq!(plan[1].kind, RecoveryActionKind::IncrementalReindex);
        }
    }

    #[test]
    fn plan_is_sorted_ascending_by_priority() {
        let plan = plan_recovery_actions(
            &[
                diagnosis(DegradationType::QuerySlowdown, DegradationSeverity::Low),
                diagnosis(DegradationType::LowConfidence, DegradationSeverity::Low),
                diagnosis(DegradationType::HighDefeaterCount, DegradationSeverity::Low),
            ],
            &ample(),
        );
        let priorities: Vec<u8> = plan.iter().map(|a| a.priority).collect();
        assert_eq!(priorities, vec![2, 3, 4]);
    }

    #[test]
    fn action_over_budget_is_excluded() {
        // Enough tokens for everything but no file allowance: the rescan
        // and reindex drop out, the file-free actions stay.
        let plan = plan_recovery_actions(
            &[
                diagnosis(DegradationType::CoverageDrop, DegradationSeverity::High),
                diagnosis(DegradationType::StaleIndex, DegradationSeverity::High),
                diagnosis(DegradationType::LowConfidence, DegradationSeverity::High),
            ],
            &ResourceUsage::new(1_000_000, 10_000, 0),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, RecoveryActionKind::TargetedReembedding);
    }

    #[test]
    fn budget_depletes_as_actions_are_planned() {
        // Budget covers the rescan alone; the reindex no longer fits after.
        let rescan_cost = ResourceUsage::new(50_000, 500, 200);
        let plan = plan_recovery_actions(
            &[
                diagnosis(DegradationType::CoverageDrop, DegradationSeverity::Medium),
                diagnosis(DegradationType::StaleIndex, DegradationSeverity::Medium),
            ],
            &rescan_cost,
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, RecoveryActionKind::FullRescan);
    }

    #[test]
    fn duplicate_degradation_types_plan_one_action() {
        let plan = plan_recovery_actions(
            &[
                diagnosis(DegradationType::StaleIndex, DegradationSeverity::Medium),
                diagnosis(DegradationType::StaleIndex, DegradationSeverity::High),
            ],
            &ample(),
        );
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn severity_scales_entity_limits() {
        let medium = plan_recovery_actions(
            &[diagnosis(DegradationType::LowConfidence, DegradationSeverity::Medium)],
            &ample(),
        );
        let critical = plan_recovery_actions(
            &[diagnosis(DegradationType::LowConfidence, DegradationSeverity::Critical)],
            &ample(),
        );
        assert!(critical[0].max_entities > medium[0].max_entities);
    }
}

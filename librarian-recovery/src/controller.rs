//! The recovery controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use librarian_core::config::SloThresholds;
use librarian_core::errors::LibrarianResult;
use librarian_core::models::{
    DegradationDiagnosis, LibrarianStateReport, RecoveryAction, RecoveryBudget, RecoveryResult,
    RecoveryState, RecoveryStatus, ResourceUsage,
};
use librarian_core::traits::{
    ActionLimits, EvidenceGraphStorage, RecoveryActionExecutor, StateReporter,
};

use crate::budget::UsageWindow;
use crate::diagnosis::diagnose_degradation;
use crate::planning::plan_recovery_actions;

/// Marker action name when a recovery run found nothing to fix.
pub const NO_ACTION_NEEDED: &str = "no_action_needed";

/// Owns the budget window, cooldown clock, in-flight guard, and state
/// machine as explicit fields. One instance per process, shared by
/// reference.
pub struct RecoveryController {
    storage: Arc<dyn EvidenceGraphStorage>,
    reporter: Arc<dyn StateReporter>,
    executor: Arc<dyn RecoveryActionExecutor>,
    budget: RecoveryBudget,
    slo: SloThresholds,
    window: UsageWindow,
    last_recovery_time: Mutex<Option<DateTime<Utc>>>,
    in_flight: AtomicBool,
    state: Mutex<RecoveryState>,
}

impl RecoveryController {
    pub fn new(
        storage: Arc<dyn EvidenceGraphStorage>,
        reporter: Arc<dyn StateReporter>,
        executor: Arc<dyn RecoveryActionExecutor>,
        budget: RecoveryBudget,
        slo: SloThresholds,
    ) -> Self {
        Self {
            storage,
            reporter,
            executor,
            budget,
            slo,
            window: UsageWindow::new(),
            last_recovery_time: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(RecoveryState::Healthy),
        }
    }

    pub fn can_use_recovery_budget(&self, usage: &ResourceUsage) -> bool {
        self.window.can_use(&self.budget, usage)
    }

    pub fn record_recovery_usage(&self, usage: &ResourceUsage) {
        self.window.record(usage);
    }

    pub fn get_remaining_budget(&self) -> ResourceUsage {
        self.window.remaining(&self.budget)
    }

    pub fn diagnose_degradation(
        &self,
        report: &LibrarianStateReport,
    ) -> Vec<DegradationDiagnosis> {
        diagnose_degradation(report, &self.slo)
    }

    pub fn plan_recovery_actions(
        &self,
        diagnoses: &[DegradationDiagnosis],
    ) -> Vec<RecoveryAction> {
        plan_recovery_actions(diagnoses, &self.get_remaining_budget())
    }

    /// Run one recovery cycle: report, diagnose, plan, execute, re-assess.
    ///
    /// Cooldown, in-flight, and budget rejections come back as
    /// `success: false` results with the reason; they never raise and have
    /// no side effects.
    pub fn execute_recovery(&self) -> LibrarianResult<RecoveryResult> {
        let started_at = Utc::now();

        let cooldown_remaining = self.cooldown_remaining_minutes(started_at);
        if cooldown_remaining > 0 {
            warn!(remaining_minutes = cooldown_remaining, "recovery rejected: cooldown");
            return Ok(RecoveryResult::rejected(
                format!("cooldown active: {cooldown_remaining} minute(s) remaining"),
                self.current_state(),
            ));
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("recovery rejected: already in progress");
            return Ok(RecoveryResult::rejected(
                "recovery already in progress",
                self.current_state(),
            ));
        }

        // The guard must clear on every exit path, including errors from
        // the reporter or executors.
        let result = self.run_cycle(started_at);
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    fn run_cycle(&self, started_at: DateTime<Utc>) -> LibrarianResult<RecoveryResult> {
        let report = self.reporter.generate_state_report(self.storage.as_ref())?;
        let diagnoses = diagnose_degradation(&report, &self.slo);

        if diagnoses.is_empty() {
            let state = self.transition_recovery_state(&report);
            info!("recovery cycle: no action needed");
            return Ok(RecoveryResult {
                success: true,
                reason: None,
                actions_executed: vec![NO_ACTION_NEEDED.to_string()],
                errors: Vec::new(),
                usage: ResourceUsage::default(),
                state,
                started_at,
                duration_ms: elapsed_ms(started_at),
            });
        }

        self.set_state(RecoveryState::Diagnosing);
        let plan = plan_recovery_actions(&diagnoses, &self.window.remaining(&self.budget));
        info!(diagnoses = diagnoses.len(), planned = plan.len(), "recovery cycle planned");

        // Diagnoses exist but nothing fits the remaining hourly budget.
        // Ran nothing, so the cooldown clock stays untouched and the next
        // window can retry immediately.
        if plan.is_empty() {
            warn!(diagnoses = diagnoses.len(), "recovery rejected: budget exhausted");
            return Ok(RecoveryResult {
                success: false,
                reason: Some(
                    "insufficient recovery budget: no planned action fits the remaining hourly window"
                        .to_string(),
                ),
                actions_executed: Vec::new(),
                errors: Vec::new(),
                usage: ResourceUsage::default(),
                state: self.current_state(),
                started_at,
                duration_ms: elapsed_ms(started_at),
            });
        }

        self.set_state(RecoveryState::Recovering);
        let mut actions_executed = Vec::new();
        let mut errors = Vec::new();
        let mut usage = ResourceUsage::default();
        for action in &plan {
            let limits = ActionLimits {
                max_entities: action.max_entities,
                max_files: action.max_files,
                reason: action.reason.clone(),
            };
            match self
                .executor
                .execute_action(self.storage.as_ref(), action.kind, &limits)
            {
                Ok(execution) => {
                    self.window.record(&execution.usage);
                    usage = usage.add(&execution.usage);
                    actions_executed.push(action.kind.name().to_string());
                    if !execution.success {
                        errors.push(format!("{} reported failure", action.kind.name()));
                    }
                    errors.extend(
                        execution
                            .errors
                            .into_iter()
                            .map(|e| format!("{}: {e}", action.kind.name())),
                    );
                }
                // One failed action never aborts the rest of the plan.
                Err(e) => errors.push(format!("{} failed: {e}", action.kind.name())),
            }
        }

        *self
            .last_recovery_time
            .lock()
            .expect("recovery clock lock poisoned") = Some(Utc::now());

        let fresh = self.reporter.generate_state_report(self.storage.as_ref())?;
        let state = self.transition_recovery_state(&fresh);
        info!(
            actions = actions_executed.len(),
            errors = errors.len(),
            ?state,
            "recovery cycle finished"
        );
        Ok(RecoveryResult {
            success: errors.is_empty(),
            reason: None,
            actions_executed,
            errors,
            usage,
            state,
            started_at,
            duration_ms: elapsed_ms(started_at),
        })
    }

    /// Advance the state machine from a fresh health assessment. The next
    /// state is computed, never supplied by the caller.
    pub fn transition_recovery_state(&self, assessment: &LibrarianStateReport) -> RecoveryState {
        let degraded = !diagnose_degradation(assessment, &self.slo).is_empty();
        let mut state = self.state.lock().expect("recovery state lock poisoned");
        let next = match (*state, degraded) {
            (_, false) => RecoveryState::Healthy,
            (RecoveryState::Healthy, true) => RecoveryState::Degraded,
            (RecoveryState::Degraded, true) => RecoveryState::Diagnosing,
            (RecoveryState::Diagnosing, true) => RecoveryState::Recovering,
            // Recovery ran and the report still shows degradation.
            (RecoveryState::Recovering, true) => RecoveryState::DegradedStable,
            (RecoveryState::DegradedStable, true) => RecoveryState::DegradedStable,
        };
        *state = next;
        next
    }

    pub fn get_recovery_status(&self) -> RecoveryStatus {
        RecoveryStatus {
            state: self.current_state(),
            in_flight: self.in_flight.load(Ordering::SeqCst),
            last_recovery_time: *self
                .last_recovery_time
                .lock()
                .expect("recovery clock lock poisoned"),
            cooldown_remaining_minutes: self.cooldown_remaining_minutes(Utc::now()),
            remaining_budget: self.get_remaining_budget(),
        }
    }

    /// Drop the cooldown, budget window, and state machine back to their
    /// initial values. Escape hatch for operators, not part of the loop.
    pub fn force_reset_recovery(&self) {
        self.window.force_reset();
        *self
            .last_recovery_time
            .lock()
            .expect("recovery clock lock poisoned") = None;
        self.in_flight.store(false, Ordering::SeqCst);
        *self.state.lock().expect("recovery state lock poisoned") = RecoveryState::Healthy;
        info!("recovery controller force-reset");
    }

    fn current_state(&self) -> RecoveryState {
        *self.state.lock().expect("recovery state lock poisoned")
    }

    fn set_state(&self, next: RecoveryState) {
        *self.state.lock().expect("recovery state lock poisoned") = next;
    }

    /// Whole minutes left in the cooldown, rounded up; 0 when clear.
    fn cooldown_remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        let last = self
            .last_recovery_time
            .lock()
            .expect("recovery clock lock poisoned");
        let Some(last) = *last else {
            return 0;
        };
        let elapsed_secs = (now - last).num_seconds();
        let cooldown_secs = self.budget.cooldown_after_recovery_minutes * 60;
        if elapsed_secs >= cooldown_secs {
            0
        } else {
            (cooldown_secs - elapsed_secs + 59) / 60
        }
    }
}

fn elapsed_ms(since: DateTime<Utc>) -> u64 {
    (Utc::now() - since).num_milliseconds().max(0) as u64
}

//! Rolling hourly budget window.
//!
//! All three resource dimensions share one window. Every operation takes
//! the window lock, resets the window if it has aged out, then reads or
//! writes, so concurrent `can_use` / `record` calls never see torn state.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

use librarian_core::constants::BUDGET_WINDOW_SECS;
use librarian_core::models::{RecoveryBudget, ResourceUsage};

struct WindowState {
    started_at: DateTime<Utc>,
    used: ResourceUsage,
}

/// Process-wide rolling usage window. Owned by the controller, never a
/// hidden global.
pub struct UsageWindow {
    inner: Mutex<WindowState>,
}

impl Default for UsageWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageWindow {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(WindowState {
                started_at: Utc::now(),
                used: ResourceUsage::default(),
            }),
        }
    }

    /// Reset in place when the window is at least an hour old.
    fn roll(state: &mut WindowState, now: DateTime<Utc>) {
        if (now - state.started_at).num_seconds() >= BUDGET_WINDOW_SECS {
            debug!(window_started = %state.started_at, "budget window rolled over");
            state.started_at = now;
            state.used = ResourceUsage::default();
        }
    }

    /// Whether `usage` fits the remaining budget in all three dimensions.
    pub fn can_use(&self, budget: &RecoveryBudget, usage: &ResourceUsage) -> bool {
        let mut state = self.inner.lock().expect("budget window lock poisoned");
        Self::roll(&mut state, Utc::now());
        usage.fits_within(&Self::remaining_of(&state, budget))
    }

    /// Add `usage` to the current window.
    pub fn record(&self, usage: &ResourceUsage) {
        let mut state = self.inner.lock().expect("budget window lock poisoned");
        Self::roll(&mut state, Utc::now());
        state.used = state.used.add(usage);
    }

    pub fn remaining(&self, budget: &RecoveryBudget) -> ResourceUsage {
        let mut state = self.inner.lock().expect("budget window lock poisoned");
        Self::roll(&mut state, Utc::now());
        Self::remaining_of(&state, budget)
    }

    pub fn used(&self) -> ResourceUsage {
        let mut state = self.inner.lock().expect("budget window lock poisoned");
        Self::roll(&mut state, Utc::now());
        state.used
    }

    /// Zero the window immediately, regardless of age.
    pub fn force_reset(&self) {
        let mut state = self.inner.lock().expect("budget window lock poisoned");
        state.started_at = Utc::now();
        state.used = ResourceUsage::default();
    }

    fn remaining_of(state: &WindowState, budget: &RecoveryBudget) -> ResourceUsage {
        ResourceUsage {
            tokens: budget.max_tokens_per_hour.saturating_sub(state.used.tokens),
            embeddings: budget
                .max_embeddings_per_hour
                .saturating_sub(state.used.embeddings),
            files: budget
                .max_reindex_files_per_hour
                .saturating_sub(state.used.files),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_starts_at_full_budget() {
        let window = UsageWindow::new();
        let budget = RecoveryBudget::default();
        let remaining = window.remaining(&budget);
        assert_eq!(remaining.tokens, budget.max_tokens_per_hour);
        assert_eq!(remaining.embeddings, budget.max_embeddings_per_hour);
        assert_eq!(remaining.files, budget.max_reindex_files_per_hour);
    }

    #[test]
    fn recording_shrinks_remaining_in_every_dimension() {
        let window = UsageWindow::new();
        let budget = RecoveryBudget::default();
        window.record(&ResourceUsage::new(1_000, 50, 10));
        let remaining = window.remaining(&budget);
        assert_eq!(remaining.tokens, budget.max_tokens_per_hour - 1_000);
        assert_eq!(remaining.embeddings, budget.max_embeddings_per_hour - 50);
        assert_eq!(remaining.files, budget.max_reindex_files_per_hour - 10);
    }

    #[test]
    fn can_use_requires_all_dimensions_to_fit() {
        let window = UsageWindow::new();
        let budget = RecoveryBudget {
            max_tokens_per_hour: 100,
            max_embeddings_per_hour: 10,
            max_reindex_files_per_hour: 5,
            cooldown_after_recovery_minutes: 30,
        };
        assert!(window.can_use(&budget, &ResourceUsage::new(100, 10, 5)));
        // One dimension over rejects the whole request.
        assert!(!window.can_use(&budget, &ResourceUsage::new(50, 11, 1)));
    }

    #[test]
    fn force_reset_restores_full_budget() {
        let window = UsageWindow::new();
        let budget = RecoveryBudget::default();
        window.record(&ResourceUsage::new(100_000, 1_000, 400));
        window.force_reset();
        assert_eq!(window.used(), ResourceUsage::default());
        assert_eq!(window.remaining(&budget).tokens, budget.max_tokens_per_hour);
    }

    #[test]
    fn overspend_saturates_instead_of_underflowing() {
        let window = UsageWindow::new();
        let budget = RecoveryBudget {
            max_tokens_per_hour: 10,
            max_embeddings_per_hour: 10,
            max_reindex_files_per_hour: 10,
            cooldown_after_recovery_minutes: 0,
        };
        window.record(&ResourceUsage::new(25, 0, 0));
        assert_eq!(window.remaining(&budget).tokens, 0);
    }
}

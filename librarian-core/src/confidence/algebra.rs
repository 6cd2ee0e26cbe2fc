//! Combination and decay operators over [`ConfidenceValue`].
//!
//! Every operator propagates provenance so a human can audit why a number
//! is what it is, and every operator respects the interval discipline:
//! AND never exceeds the weaker operand, OR never falls below the stronger.

use chrono::Duration;

use crate::constants::DECAY_FLOOR;

use super::value::{BoundsBasis, ConfidenceValue};

/// A value viewed as an interval for combination purposes.
/// Point variants collapse to `[v, v]`.
fn as_interval(value: &ConfidenceValue) -> Option<(f64, f64)> {
    match value {
        ConfidenceValue::Bounded { lower, upper, .. } => Some((*lower, *upper)),
        other => other.effective().map(|v| (v, v)),
    }
}

/// Merge interval bases: keep agreement, otherwise the combination is
/// empirical at best.
fn merge_basis(a: &ConfidenceValue, b: &ConfidenceValue) -> BoundsBasis {
    match (a, b) {
        (
            ConfidenceValue::Bounded { basis: ba, .. },
            ConfidenceValue::Bounded { basis: bb, .. },
        ) if ba == bb => *ba,
        _ => BoundsBasis::Empirical,
    }
}

fn is_point(value: &ConfidenceValue) -> bool {
    !matches!(value, ConfidenceValue::Bounded { .. })
}

impl ConfidenceValue {
    /// Combine two independent pieces of evidence supporting a conjunction.
    ///
    /// The result's effective confidence never exceeds
    /// `min(effective(a), effective(b))`. An `Absent` operand contributes
    /// nothing and the other operand passes through unchanged.
    pub fn and_combine(&self, other: &Self) -> Self {
        let provenance = format!("and({}, {})", self.provenance(), other.provenance());

        match (self, other) {
            (Self::Absent { .. }, Self::Absent { .. }) => Self::Absent {
                reason: provenance,
            },
            (Self::Absent { .. }, rhs) => rhs.clone(),
            (lhs, Self::Absent { .. }) => lhs.clone(),

            // A refuted fact refutes the conjunction outright.
            (Self::Deterministic { value: false, .. }, _)
            | (_, Self::Deterministic { value: false, .. }) => Self::Deterministic {
                value: false,
                basis: provenance,
            },
            (Self::Deterministic { value: true, .. }, Self::Deterministic { value: true, .. }) => {
                Self::Deterministic {
                    value: true,
                    basis: provenance,
                }
            }

            (lhs, rhs) => {
                // Both operands reduce to intervals here; Absent was handled above.
                let (la, ua) = as_interval(lhs).unwrap_or((0.0, 0.0));
                let (lb, ub) = as_interval(rhs).unwrap_or((0.0, 0.0));
                let lower = (la * lb).clamp(0.0, 1.0);
                let upper = (ua * ub).clamp(0.0, 1.0);
                if is_point(lhs) && is_point(rhs) {
                    Self::Measured {
                        value: upper,
                        source: provenance,
                    }
                } else {
                    Self::Bounded {
                        lower,
                        upper,
                        basis: merge_basis(lhs, rhs),
                        source: provenance,
                    }
                }
            }
        }
    }

    /// Combine two independent pieces of evidence supporting a disjunction.
    ///
    /// Noisy-OR: the result's effective confidence never falls below
    /// `max(effective(a), effective(b))`.
    pub fn or_combine(&self, other: &Self) -> Self {
        let provenance = format!("or({}, {})", self.provenance(), other.provenance());

        match (self, other) {
            (Self::Absent { .. }, Self::Absent { .. }) => Self::Absent {
                reason: provenance,
            },
            (Self::Absent { .. }, rhs) => rhs.clone(),
            (lhs, Self::Absent { .. }) => lhs.clone(),

            // An established fact establishes the disjunction outright.
            (Self::Deterministic { value: true, .. }, _)
            | (_, Self::Deterministic { value: true, .. }) => Self::Deterministic {
                value: true,
                basis: provenance,
            },
            (Self::Deterministic { value: false, .. }, Self::Deterministic { value: false, .. }) => {
                Self::Deterministic {
                    value: false,
                    basis: provenance,
                }
            }

            (lhs, rhs) => {
                let (la, ua) = as_interval(lhs).unwrap_or((0.0, 0.0));
                let (lb, ub) = as_interval(rhs).unwrap_or((0.0, 0.0));
                let lower = (1.0 - (1.0 - la) * (1.0 - lb)).clamp(0.0, 1.0);
                let upper = (1.0 - (1.0 - ua) * (1.0 - ub)).clamp(0.0, 1.0);
                if is_point(lhs) && is_point(rhs) {
                    Self::Measured {
                        value: upper,
                        source: provenance,
                    }
                } else {
                    Self::Bounded {
                        lower,
                        upper,
                        basis: merge_basis(lhs, rhs),
                        source: provenance,
                    }
                }
            }
        }
    }

    /// Reduce confidence as evidence ages, half-life style, toward
    /// [`DECAY_FLOOR`]. Never increases confidence; values already at or
    /// below the floor are left alone.
    ///
    /// `Deterministic` and `Absent` are fixed points — a recorded
    /// observation does not become less of an observation with age
    /// (staleness defeaters handle aging facts separately).
    pub fn apply_decay(&self, elapsed: Duration, half_life: Duration) -> Self {
        if elapsed <= Duration::zero() || half_life <= Duration::zero() {
            return self.clone();
        }
        let factor = 0.5_f64.powf(elapsed.num_seconds() as f64 / half_life.num_seconds() as f64);
        let decay = |v: f64| -> f64 {
            if v <= DECAY_FLOOR {
                v
            } else {
                (v * factor).max(DECAY_FLOOR)
            }
        };
        let provenance = |prov: &str| {
            format!(
                "decay({prov}, elapsed={}s, half_life={}s)",
                elapsed.num_seconds(),
                half_life.num_seconds()
            )
        };

        match self {
            Self::Deterministic { .. } | Self::Absent { .. } => self.clone(),
            Self::Bounded {
                lower,
                upper,
                basis,
                source,
            } => Self::Bounded {
                lower: decay(*lower),
                upper: decay(*upper),
                basis: *basis,
                source: provenance(source),
            },
            Self::Derived {
                raw,
                calibrated,
                status,
                source,
            } => Self::Derived {
                raw: decay(*raw),
                calibrated: decay(*calibrated),
                status: *status,
                source: provenance(source),
            },
            Self::Measured { value, source } => Self::Measured {
                value: decay(*value),
                source: provenance(source),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::BoundsBasis;

    fn bounded(lower: f64, upper: f64) -> ConfidenceValue {
        ConfidenceValue::bounded(lower, upper, BoundsBasis::Theoretical, "test").unwrap()
    }

    #[test]
    fn and_never_exceeds_weaker_operand() {
        let a = bounded(0.6, 0.8);
        let b = ConfidenceValue::measured(0.5, "test").unwrap();
        let combined = a.and_combine(&b);
        let limit = a.effective().unwrap().min(b.effective().unwrap());
        assert!(combined.effective().unwrap() <= limit + 1e-12);
    }

    #[test]
    fn or_never_falls_below_stronger_operand() {
        let a = bounded(0.2, 0.4);
        let b = ConfidenceValue::measured(0.7, "test").unwrap();
        let combined = a.or_combine(&b);
        let limit = a.effective().unwrap().max(b.effective().unwrap());
        assert!(combined.effective().unwrap() >= limit - 1e-12);
    }

    #[test]
    fn refuted_fact_refutes_conjunction() {
        let fact = ConfidenceValue::deterministic(false, "test run");
        let other = bounded(0.9, 1.0);
        assert_eq!(fact.and_combine(&other).effective(), Some(0.0));
    }

    #[test]
    fn absent_passes_through_combination() {
        let absent = ConfidenceValue::absent("no signal");
        let b = bounded(0.3, 0.5);
        assert_eq!(absent.and_combine(&b), b);
        assert_eq!(b.or_combine(&absent), b);
    }

    #[test]
    fn decay_is_monotone_and_floored() {
        let v = ConfidenceValue::measured(0.8, "test").unwrap();
        let day = Duration::days(1);
        let week = Duration::days(7);
        let half_life = Duration::days(3);
        let short = v.apply_decay(day, half_life).effective().unwrap();
        let long = v.apply_decay(week, half_life).effective().unwrap();
        assert!(short <= 0.8);
        assert!(long <= short);
        let ancient = v
            .apply_decay(Duration::days(10_000), half_life)
            .effective()
            .unwrap();
        assert!((ancient - DECAY_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn deterministic_does_not_decay() {
        let fact = ConfidenceValue::deterministic(true, "observed");
        let decayed = fact.apply_decay(Duration::days(365), Duration::days(1));
        assert_eq!(fact, decayed);
    }

    #[test]
    fn provenance_propagates_through_operators() {
        let a = bounded(0.6, 0.8);
        let b = ConfidenceValue::measured(0.5, "latency_probe").unwrap();
        let combined = a.and_combine(&b);
        assert!(combined.provenance().contains("test"));
        assert!(combined.provenance().contains("latency_probe"));
    }
}

//! Workspace-wide configuration, toml-loadable with full defaults.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{LibrarianError, LibrarianResult};
use crate::models::{DefeaterSeverity, RecoveryBudget};

/// Defeater detection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Claims unverified for longer than this get staleness defeaters.
    pub staleness_threshold_days: i64,
    /// Age at which a staleness defeater escalates from warning to partial.
    pub staleness_escalation_days: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            staleness_threshold_days: constants::DEFAULT_STALENESS_THRESHOLD_DAYS,
            staleness_escalation_days: constants::DEFAULT_STALENESS_THRESHOLD_DAYS * 3,
        }
    }
}

/// Defeater-ledger bridge tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Detections below this severity are not recorded in the ledger.
    pub minimum_record_severity: DefeaterSeverity,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            minimum_record_severity: DefeaterSeverity::Warning,
        }
    }
}

/// Calibration engine tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationOptions {
    pub bucket_count: usize,
    /// Below this many bucket samples, no adjustment is applied.
    pub min_samples_for_adjustment: usize,
    /// At this many bucket samples, the empirical value fully replaces raw.
    pub min_samples_for_full_weight: usize,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            bucket_count: 10,
            min_samples_for_adjustment: 5,
            min_samples_for_full_weight: 20,
        }
    }
}

/// SLO thresholds the recovery controller diagnoses against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SloThresholds {
    pub max_index_age_hours: f64,
    pub min_geometric_mean_confidence: f64,
    pub max_active_defeaters: usize,
    pub max_p99_latency_ms: f64,
    pub min_coverage_ratio: f64,
}

impl Default for SloThresholds {
    fn default() -> Self {
        Self {
            max_index_age_hours: 24.0,
            min_geometric_mean_confidence: 0.5,
            max_active_defeaters: 25,
            max_p99_latency_ms: 1_500.0,
            min_coverage_ratio: 0.7,
        }
    }
}

/// Top-level configuration aggregating every subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarianConfig {
    pub detection: DetectionConfig,
    pub bridge: BridgeConfig,
    pub calibration: CalibrationOptions,
    pub slo: SloThresholds,
    pub budget: RecoveryBudget,
}

impl LibrarianConfig {
    /// Parse from a toml document; missing sections fall back to defaults.
    pub fn from_toml_str(input: &str) -> LibrarianResult<Self> {
        toml::from_str(input).map_err(|e| LibrarianError::Config {
            reason: e.to_string(),
        })
    }
}

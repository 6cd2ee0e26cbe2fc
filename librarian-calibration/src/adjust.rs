//! Adjusting a stated confidence against a calibration report.

use tracing::debug;

use librarian_core::config::CalibrationOptions;
use librarian_core::confidence::{CalibrationStatus, ConfidenceValue};
use librarian_core::errors::{LibrarianError, LibrarianResult};
use librarian_core::models::{CalibrationAdjustment, CalibrationReport};

/// Blend a stated confidence toward the empirical accuracy of its bucket.
///
/// The blend weight ramps linearly from 0 at `min_samples_for_adjustment`
/// bucket samples to 1 at `min_samples_for_full_weight`. Below the floor
/// the result is `InsufficientData` with `calibrated == raw`. The returned
/// confidence is always the `Derived` variant, never the input variant.
pub fn adjust_confidence_value(
    value: &ConfidenceValue,
    report: &CalibrationReport,
    options: &CalibrationOptions,
) -> LibrarianResult<CalibrationAdjustment> {
    let Some(raw) = value.effective() else {
        return Err(LibrarianError::validation(
            "absent confidence has no effective value to calibrate",
        ));
    };

    let bucket = report.curve.bucket_for(raw);
    let bucket_samples = bucket.map(|b| b.sample_count).unwrap_or(0);
    let empirical = bucket.and_then(|b| b.empirical_accuracy);

    let (calibrated, status) = match empirical {
        Some(empirical) if bucket_samples >= options.min_samples_for_adjustment => {
            let weight = blend_weight(
                bucket_samples,
                options.min_samples_for_adjustment,
                options.min_samples_for_full_weight,
            );
            (
                raw + weight * (empirical - raw),
                CalibrationStatus::Calibrated,
            )
        }
        _ => (raw, CalibrationStatus::InsufficientData),
    };

    debug!(
        dataset = %report.dataset_id,
        raw,
        calibrated,
        bucket_samples,
        ?status,
        "confidence adjusted"
    );
    let confidence = ConfidenceValue::derived(
        raw,
        calibrated.clamp(0.0, 1.0),
        status,
        format!("calibrated({}) from {}", report.dataset_id, value.provenance()),
    )?;
    Ok(CalibrationAdjustment {
        confidence,
        raw,
        calibrated,
        status,
        bucket_samples,
    })
}

fn blend_weight(samples: usize, min_adjust: usize, full_weight: usize) -> f64 {
    if full_weight <= min_adjust || samples >= full_weight {
        return 1.0;
    }
    (samples - min_adjust) as f64 / (full_weight - min_adjust) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{build_calibration_report, compute_calibration_curve};
    use chrono::Utc;
    use librarian_core::models::CalibrationSample;

    fn report_from(samples: &[(f64, f64)], bucket_count: usize) -> CalibrationReport {
        let samples: Vec<CalibrationSample> = samples
            .iter()
            .map(|&(confidence, outcome)| CalibrationSample {
                confidence,
                outcome,
            })
            .collect();
        let curve = compute_calibration_curve(&samples, bucket_count).unwrap();
        build_calibration_report("test", curve, Utc::now())
    }

    #[test]
    fn below_floor_is_insufficient_and_unchanged() {
        let report = report_from(&[(0.8, 1.0)], 2);
        let options = CalibrationOptions {
            bucket_count: 2,
            min_samples_for_adjustment: 5,
            min_samples_for_full_weight: 20,
        };
        let stated = ConfidenceValue::measured(0.8, "review").unwrap();
        let adjustment = adjust_confidence_value(&stated, &report, &options).unwrap();
        assert_eq!(adjustment.status, CalibrationStatus::InsufficientData);
        assert_eq!(adjustment.calibrated, adjustment.raw);
        assert!(matches!(
            adjustment.confidence,
            ConfidenceValue::Derived { .. }
        ));
    }

    #[test]
    fn full_weight_replaces_raw_with_empirical() {
        // Bucket containing 0.8 has accuracy 2/3.
        let report = report_from(&[(0.8, 1.0), (0.75, 1.0), (0.85, 0.0)], 2);
        let options = CalibrationOptions {
            bucket_count: 2,
            min_samples_for_adjustment: 1,
            min_samples_for_full_weight: 3,
        };
        let stated = ConfidenceValue::measured(0.8, "review").unwrap();
        let adjustment = adjust_confidence_value(&stated, &report, &options).unwrap();
        assert_eq!(adjustment.status, CalibrationStatus::Calibrated);
        assert!((adjustment.calibrated - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn partial_weight_blends_linearly() {
        // 2 samples, ramp from 1 to 3: weight = 0.5.
        let report = report_from(&[(0.8, 1.0), (0.85, 1.0)], 2);
        let options = CalibrationOptions {
            bucket_count: 2,
            min_samples_for_adjustment: 1,
            min_samples_for_full_weight: 3,
        };
        let stated = ConfidenceValue::measured(0.6, "review").unwrap();
        let adjustment = adjust_confidence_value(&stated, &report, &options).unwrap();
        // raw 0.6, empirical 1.0, weight 0.5 -> 0.8.
        assert!((adjustment.calibrated - 0.8).abs() < 1e-9);
    }

    #[test]
    fn absent_confidence_is_rejected() {
        let report = report_from(&[(0.8, 1.0)], 2);
        let absent = ConfidenceValue::absent("never measured");
        assert!(adjust_confidence_value(&absent, &report, &CalibrationOptions::default()).is_err());
    }

    #[test]
    fn adjustment_provenance_names_the_dataset() {
        let report = report_from(&[(0.8, 1.0)], 2);
        let stated = ConfidenceValue::measured(0.8, "review").unwrap();
        let adjustment =
            adjust_confidence_value(&stated, &report, &CalibrationOptions::default()).unwrap();
        assert!(adjustment.confidence.provenance().contains("calibrated(test)"));
    }
}

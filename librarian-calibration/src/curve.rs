//! Empirical accuracy curves over equal-width confidence buckets.

use chrono::{DateTime, Utc};

use librarian_core::errors::{LibrarianError, LibrarianResult};
use librarian_core::models::{
    CalibrationBucket, CalibrationCurve, CalibrationReport, CalibrationSample,
};

/// Partition samples into `bucket_count` equal-width buckets over `[0, 1]`
/// and compute each bucket's mean outcome.
///
/// Empty buckets carry `empirical_accuracy: None` rather than a fabricated
/// zero. Samples at exactly `1.0` land in the last bucket.
pub fn compute_calibration_curve(
    samples: &[CalibrationSample],
    bucket_count: usize,
) -> LibrarianResult<CalibrationCurve> {
    if bucket_count == 0 {
        return Err(LibrarianError::validation(
            "calibration curve needs at least one bucket",
        ));
    }

    let width = 1.0 / bucket_count as f64;
    let mut buckets: Vec<CalibrationBucket> = (0..bucket_count)
        .map(|i| CalibrationBucket {
            lower: i as f64 * width,
            upper: if i + 1 == bucket_count {
                1.0
            } else {
                (i + 1) as f64 * width
            },
            sample_count: 0,
            empirical_accuracy: None,
        })
        .collect();

    let mut outcome_sums = vec![0.0_f64; bucket_count];
    for sample in samples {
        if !(0.0..=1.0).contains(&sample.confidence) {
            return Err(LibrarianError::validation(format!(
                "calibration sample confidence {} outside [0, 1]",
                sample.confidence
            )));
        }
        let index = ((sample.confidence / width) as usize).min(bucket_count - 1);
        buckets[index].sample_count += 1;
        outcome_sums[index] += sample.outcome;
    }
    for (bucket, sum) in buckets.iter_mut().zip(outcome_sums) {
        if bucket.sample_count > 0 {
            bucket.empirical_accuracy = Some(sum / bucket.sample_count as f64);
        }
    }

    Ok(CalibrationCurve {
        bucket_count,
        buckets,
    })
}

/// Wrap a curve with dataset identity and computation time.
pub fn build_calibration_report(
    dataset_id: impl Into<String>,
    curve: CalibrationCurve,
    computed_at: DateTime<Utc>,
) -> CalibrationReport {
    CalibrationReport {
        dataset_id: dataset_id.into(),
        curve,
        computed_at,
    }
}

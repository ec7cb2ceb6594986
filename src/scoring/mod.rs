//! Anomaly Scorer - Pipeline Orchestration
//!
//! One synchronous pipeline per batch:
//! validate -> extract -> scale -> reconstruct -> error -> threshold ->
//! verdict. Each batch runs to completion or fails outright; there is no
//! partial verdict. The only state carried across batches is the error
//! buffer.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::SensorBatch;
use crate::config::ScoringConfig;
use crate::error::{ModelLoadError, ScoringError, ScoringResult};
use crate::features;
use crate::model::{
    ErrorBuffer, FeatureScaler, OnnxAutoencoder, ReconstructionModel, StandardScaler,
    ThresholdStats,
};

/// Verdict for one scored batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    /// Caller-supplied label; plays no part in the decision.
    pub timestamp: DateTime<Utc>,
    pub reconstruction_error: f64,
    pub is_anomaly: bool,
}

/// Scorer status for health surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerStatus {
    pub scored_batches: u64,
    pub avg_latency_ms: f64,
    pub threshold: ThresholdStats,
}

/// Scores batches against the frozen scaler + autoencoder pair and the
/// adaptive error threshold.
///
/// `score` takes `&self`, so an `Arc<AnomalyScorer>` can be shared across
/// threads; the error buffer's lock serializes the order-sensitive
/// record-then-threshold section.
pub struct AnomalyScorer {
    scaler: Box<dyn FeatureScaler>,
    model: Box<dyn ReconstructionModel>,
    errors: ErrorBuffer,
    latency_sum_us: AtomicU64,
    scored: AtomicU64,
}

impl AnomalyScorer {
    /// Assemble from parts. The artifacts are injected, so the scorer
    /// never knows about file formats.
    pub fn new(
        scaler: Box<dyn FeatureScaler>,
        model: Box<dyn ReconstructionModel>,
        errors: ErrorBuffer,
    ) -> Self {
        Self {
            scaler,
            model,
            errors,
            latency_sum_us: AtomicU64::new(0),
            scored: AtomicU64::new(0),
        }
    }

    /// Load the frozen artifacts and build the scorer. Fails fast: a
    /// process without valid models must not serve traffic.
    pub fn from_config(config: &ScoringConfig) -> Result<Self, ModelLoadError> {
        let scaler = StandardScaler::from_file(&config.scaler_path)?;
        let model = OnnxAutoencoder::load(&config.model_path, config.model_checksum.as_deref())?;

        let errors = match config.error_retention {
            Some(cap) => ErrorBuffer::with_retention(cap),
            None => ErrorBuffer::new(),
        };

        Ok(Self::new(Box::new(scaler), Box::new(model), errors))
    }

    /// Score one batch.
    ///
    /// Any failure before the error is recorded leaves the buffer
    /// untouched. The error is recorded *before* the threshold lookup —
    /// atomically, in one critical section — so the current observation
    /// participates in its own percentile.
    pub fn score(&self, batch: &SensorBatch, now: DateTime<Utc>) -> ScoringResult<AnomalyVerdict> {
        let start = std::time::Instant::now();

        let vector = features::extract(batch)?;
        let scaled = self.scaler.scale(&vector)?;
        let reconstruction = self.model.reconstruct(&scaled)?;
        let error = reconstruction_error(&scaled, &reconstruction)?;

        let threshold = self.errors.record_and_threshold(error);
        let is_anomaly = error > threshold;

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.scored.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "batch scored: error={:.6} threshold={:.6} anomaly={}",
            error,
            threshold,
            is_anomaly
        );

        Ok(AnomalyVerdict {
            timestamp: now,
            reconstruction_error: error,
            is_anomaly,
        })
    }

    /// The error history behind the adaptive threshold.
    pub fn error_buffer(&self) -> &ErrorBuffer {
        &self.errors
    }

    pub fn status(&self) -> ScorerStatus {
        let scored = self.scored.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if scored > 0 {
            (sum as f64 / scored as f64) / 1000.0
        } else {
            0.0
        };

        ScorerStatus {
            scored_batches: scored,
            avg_latency_ms: avg,
            threshold: self.errors.stats(),
        }
    }
}

/// Mean absolute difference between reconstruction and scaled input.
fn reconstruction_error(scaled: &[f64], reconstruction: &[f64]) -> ScoringResult<f64> {
    if scaled.len() != reconstruction.len() || scaled.is_empty() {
        return Err(ScoringError::Inference(format!(
            "reconstruction shape mismatch: input {}, output {}",
            scaled.len(),
            reconstruction.len()
        )));
    }

    let error = scaled
        .iter()
        .zip(reconstruction.iter())
        .map(|(a, b)| (a - b).abs())
        .sum::<f64>()
        / scaled.len() as f64;

    if !error.is_finite() {
        return Err(ScoringError::Inference(
            "reconstruction produced non-finite values".to_string(),
        ));
    }

    Ok(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::SensorSample;
    use crate::constants::BATCH_SIZE;
    use crate::features::FEATURE_COUNT;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Shifts every reconstructed value by the next scripted offset, so a
    /// scored batch produces exactly that reconstruction error. Repeats
    /// the last offset once the script runs out.
    struct ShiftModel {
        shifts: Mutex<Vec<f64>>,
        last: Mutex<f64>,
    }

    impl ShiftModel {
        fn scripted(shifts: &[f64]) -> Self {
            Self {
                shifts: Mutex::new(shifts.to_vec()),
                last: Mutex::new(0.0),
            }
        }

        fn constant(shift: f64) -> Self {
            Self::scripted(&[shift])
        }
    }

    impl ReconstructionModel for ShiftModel {
        fn reconstruct(&self, input: &[f64]) -> ScoringResult<Vec<f64>> {
            let mut shifts = self.shifts.lock();
            let shift = if shifts.is_empty() {
                *self.last.lock()
            } else {
                let s = shifts.remove(0);
                *self.last.lock() = s;
                s
            };
            Ok(input.iter().map(|v| v + shift).collect())
        }
    }

    struct FailingModel;

    impl ReconstructionModel for FailingModel {
        fn reconstruct(&self, _input: &[f64]) -> ScoringResult<Vec<f64>> {
            Err(ScoringError::Inference("backend exploded".to_string()))
        }
    }

    fn identity_scaler() -> Box<dyn FeatureScaler> {
        Box::new(StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap())
    }

    fn scorer_with(model: Box<dyn ReconstructionModel>) -> AnomalyScorer {
        AnomalyScorer::new(identity_scaler(), model, ErrorBuffer::new())
    }

    fn test_batch() -> SensorBatch {
        SensorBatch::new(
            (0..BATCH_SIZE)
                .map(|i| SensorSample::new(i as f64, 1.0, -1.0, 9.81))
                .collect(),
        )
    }

    #[test]
    fn test_first_batch_is_never_anomalous() {
        let scorer = scorer_with(Box::new(ShiftModel::constant(123.0)));
        let verdict = scorer.score(&test_batch(), Utc::now()).unwrap();

        assert!((verdict.reconstruction_error - 123.0).abs() < 1e-9);
        assert!(!verdict.is_anomaly);
        assert_eq!(scorer.error_buffer().len(), 1);
    }

    #[test]
    fn test_outlier_is_flagged_after_history_builds() {
        let scorer = scorer_with(Box::new(ShiftModel::scripted(&[1.0, 1.0, 1.0, 100.0])));
        let batch = test_batch();

        for _ in 0..3 {
            let verdict = scorer.score(&batch, Utc::now()).unwrap();
            assert!(!verdict.is_anomaly);
        }

        // sorted history [1, 1, 1, 100]: threshold 97.03 < 100
        let verdict = scorer.score(&batch, Utc::now()).unwrap();
        assert!(verdict.is_anomaly);
        assert!((verdict.reconstruction_error - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_errors_never_flag() {
        // error == threshold at every step; the comparison is strict.
        let scorer = scorer_with(Box::new(ShiftModel::constant(2.5)));
        let batch = test_batch();

        for _ in 0..10 {
            assert!(!scorer.score(&batch, Utc::now()).unwrap().is_anomaly);
        }
    }

    #[test]
    fn test_invalid_batch_leaves_buffer_untouched() {
        let scorer = scorer_with(Box::new(ShiftModel::constant(1.0)));
        let short = SensorBatch::new(vec![SensorSample::new(0.0, 0.0, 0.0, 0.0); BATCH_SIZE - 1]);

        assert!(matches!(
            scorer.score(&short, Utc::now()),
            Err(ScoringError::InvalidBatchSize { actual }) if actual == BATCH_SIZE - 1
        ));
        assert!(scorer.error_buffer().is_empty());
    }

    #[test]
    fn test_model_failure_leaves_buffer_untouched() {
        let scorer = scorer_with(Box::new(FailingModel));

        assert!(matches!(
            scorer.score(&test_batch(), Utc::now()),
            Err(ScoringError::Inference(_))
        ));
        assert!(scorer.error_buffer().is_empty());
        assert_eq!(scorer.status().scored_batches, 0);
    }

    #[test]
    fn test_non_finite_reconstruction_is_an_inference_error() {
        let scorer = scorer_with(Box::new(ShiftModel::constant(f64::NAN)));

        assert!(matches!(
            scorer.score(&test_batch(), Utc::now()),
            Err(ScoringError::Inference(_))
        ));
        assert!(scorer.error_buffer().is_empty());
    }

    #[test]
    fn test_concurrent_scoring_loses_no_history() {
        let scorer = Arc::new(scorer_with(Box::new(ShiftModel::constant(1.0))));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let scorer = Arc::clone(&scorer);
            handles.push(std::thread::spawn(move || {
                let batch = test_batch();
                for _ in 0..25 {
                    scorer.score(&batch, Utc::now()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(scorer.error_buffer().len(), 200);
        assert_eq!(scorer.status().scored_batches, 200);
    }

    #[test]
    fn test_verdict_serializes_iso8601() {
        let scorer = scorer_with(Box::new(ShiftModel::constant(0.5)));
        let now = Utc::now();
        let verdict = scorer.score(&test_batch(), now).unwrap();
        assert_eq!(verdict.timestamp, now);

        let json = serde_json::to_value(&verdict).unwrap();
        let stamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(json["is_anomaly"], false);
    }

    #[test]
    fn test_status_tracks_latency_and_count() {
        let scorer = scorer_with(Box::new(ShiftModel::constant(1.0)));
        let batch = test_batch();

        scorer.score(&batch, Utc::now()).unwrap();
        scorer.score(&batch, Utc::now()).unwrap();

        let status = scorer.status();
        assert_eq!(status.scored_batches, 2);
        assert_eq!(status.threshold.sample_count, 2);
        assert!(status.avg_latency_ms >= 0.0);
    }
}

//! Batch Feature Extraction
//!
//! Turns one 24-sample batch into the fixed 24-value feature vector the
//! autoencoder was trained on. Pure function of its input.

use crate::batch::SensorBatch;
use crate::constants::BATCH_SIZE;
use crate::error::{ScoringError, ScoringResult};

use super::layout::{feature_name, FEATURE_COUNT};
use super::stats::ChannelStats;
use super::vector::FeatureVector;

/// Extract the feature vector from a full batch window.
///
/// Layout: the four last-sample scalars (magnitude, x, y, z), then the
/// five-statistic block per channel in x, magnitude, y, z order. Fails
/// with `InvalidBatchSize` on anything but a 24-sample batch and with
/// `FeatureComputation` if a statistic comes out non-finite.
pub fn extract(batch: &SensorBatch) -> ScoringResult<FeatureVector> {
    batch.validate()?;

    let last = &batch.data[BATCH_SIZE - 1];

    let mut values = [0.0f64; FEATURE_COUNT];
    values[0] = last.magnitude;
    values[1] = last.x;
    values[2] = last.y;
    values[3] = last.z;

    let mut idx = 4;
    for channel in [batch.xs(), batch.magnitudes(), batch.ys(), batch.zs()] {
        let stats = ChannelStats::compute(&channel);
        values[idx] = stats.mean;
        values[idx + 1] = stats.std;
        values[idx + 2] = stats.last_minus_mean;
        values[idx + 3] = stats.skewness;
        values[idx + 4] = stats.kurtosis;
        idx += 5;
    }

    let vector = FeatureVector::from_values(values);
    if let Some(bad) = vector.values.iter().position(|v| !v.is_finite()) {
        return Err(ScoringError::FeatureComputation {
            feature: feature_name(bad).unwrap_or("unknown"),
        });
    }

    Ok(vector)
}

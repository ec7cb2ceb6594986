//! Frozen Feature Scaler
//!
//! Normalizes feature vectors into the distribution the autoencoder was
//! trained on. The parameters come from a JSON sidecar exported by the
//! training job and are read-only for the lifetime of the process.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelLoadError, ScoringError, ScoringResult};
use crate::features::layout::validate_layout;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Scaling capability the scorer depends on.
///
/// Implementations must be deterministic and stateless at inference time.
pub trait FeatureScaler: Send + Sync {
    /// Map a feature vector to the model's normalized input space.
    /// Output length equals the input length.
    fn scale(&self, vector: &FeatureVector) -> ScoringResult<Vec<f64>>;
}

/// Serialized scaler parameters, stamped with the feature layout they were
/// fitted against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Standard scaler: `(x - mean) / scale` per feature.
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Build from raw parameter vectors. Both must have one entry per
    /// feature.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelLoadError> {
        if mean.len() != FEATURE_COUNT || scale.len() != FEATURE_COUNT {
            return Err(ModelLoadError::BadArtifact {
                path: "<memory>".to_string(),
                reason: format!(
                    "scaler parameter length mismatch: mean={}, scale={}, expected {}",
                    mean.len(),
                    scale.len(),
                    FEATURE_COUNT
                ),
            });
        }
        Ok(Self { mean, scale })
    }

    /// Load the frozen artifact from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: display.clone(),
            source,
        })?;

        let artifact: ScalerArtifact =
            serde_json::from_str(&content).map_err(|e| ModelLoadError::BadArtifact {
                path: display.clone(),
                reason: e.to_string(),
            })?;

        validate_layout(artifact.feature_version, artifact.layout_hash).map_err(|e| {
            ModelLoadError::BadArtifact {
                path: display.clone(),
                reason: e.to_string(),
            }
        })?;

        let scaler = Self::new(artifact.mean, artifact.scale).map_err(|e| match e {
            ModelLoadError::BadArtifact { reason, .. } => ModelLoadError::BadArtifact {
                path: display.clone(),
                reason,
            },
            other => other,
        })?;

        log::info!("Scaler loaded from {} ({} features)", display, FEATURE_COUNT);
        Ok(scaler)
    }
}

impl FeatureScaler for StandardScaler {
    fn scale(&self, vector: &FeatureVector) -> ScoringResult<Vec<f64>> {
        vector
            .validate()
            .map_err(|e| ScoringError::Inference(e.to_string()))?;

        Ok(vector
            .values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            // Zero-variance features were exported with scale 0; floor the
            // divisor the same way the training export does.
            .map(|(v, (m, s))| (v - m) / s.max(1e-8))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{layout_hash, FEATURE_VERSION};
    use std::io::Write;

    fn artifact_json(mean: Vec<f64>, scale: Vec<f64>) -> String {
        serde_json::to_string(&ScalerArtifact {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            mean,
            scale,
        })
        .unwrap()
    }

    #[test]
    fn test_scale_is_deterministic_and_elementwise() {
        let scaler =
            StandardScaler::new(vec![1.0; FEATURE_COUNT], vec![2.0; FEATURE_COUNT]).unwrap();
        let vector = FeatureVector::from_values([5.0; FEATURE_COUNT]);

        let scaled = scaler.scale(&vector).unwrap();
        assert_eq!(scaled.len(), FEATURE_COUNT);
        assert!(scaled.iter().all(|v| (*v - 2.0).abs() < 1e-12));

        assert_eq!(scaled, scaler.scale(&vector).unwrap());
    }

    #[test]
    fn test_zero_scale_does_not_divide_by_zero() {
        let scaler =
            StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![0.0; FEATURE_COUNT]).unwrap();
        let vector = FeatureVector::from_values([1.0; FEATURE_COUNT]);

        let scaled = scaler.scale(&vector).unwrap();
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(StandardScaler::new(vec![0.0; 3], vec![1.0; FEATURE_COUNT]).is_err());
        assert!(StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            artifact_json(vec![0.5; FEATURE_COUNT], vec![1.5; FEATURE_COUNT])
        )
        .unwrap();

        let scaler = StandardScaler::from_file(file.path()).unwrap();
        let vector = FeatureVector::from_values([2.0; FEATURE_COUNT]);
        let scaled = scaler.scale(&vector).unwrap();
        assert!((scaled[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_file_rejects_stale_layout() {
        let artifact = ScalerArtifact {
            feature_version: FEATURE_VERSION + 1,
            layout_hash: layout_hash(),
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&artifact).unwrap()).unwrap();

        assert!(matches!(
            StandardScaler::from_file(file.path()),
            Err(ModelLoadError::BadArtifact { .. })
        ));
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        assert!(matches!(
            StandardScaler::from_file("/definitely/not/here.json"),
            Err(ModelLoadError::Io { .. })
        ));
    }
}

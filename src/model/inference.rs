//! Reconstruction Model - ONNX Runtime Integration
//!
//! Loads the frozen autoencoder and runs it on a scaled feature vector.
//! The scoring core only sees the `ReconstructionModel` trait; everything
//! ONNX-specific stays behind it so the model format can be swapped.

use ndarray::Array3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;

use crate::error::{ModelLoadError, ScoringError, ScoringResult};
use crate::features::FEATURE_COUNT;

/// Reconstruction capability the scorer depends on.
///
/// Input and output have the same shape; implementations are frozen
/// artifacts, immutable after load.
pub trait ReconstructionModel: Send + Sync {
    /// Reconstruct a normalized vector. Output length equals input length.
    fn reconstruct(&self, input: &[f64]) -> ScoringResult<Vec<f64>>;
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub input_features: usize,
    pub checksum_sha256: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Frozen autoencoder behind an ONNX Runtime session.
///
/// `Session::run` needs `&mut`, so the session sits behind a mutex; the
/// weights themselves never change after load.
#[derive(Debug)]
pub struct OnnxAutoencoder {
    session: Mutex<Session>,
    metadata: ModelMetadata,
}

impl OnnxAutoencoder {
    /// Load the model from disk, optionally verifying its SHA-256 first.
    ///
    /// Any failure here is fatal to startup: the scorer must not serve
    /// traffic without a valid model, so there is no retry or fallback.
    pub fn load(
        model_path: &str,
        expected_checksum: Option<&str>,
    ) -> Result<Self, ModelLoadError> {
        log::info!("Loading ONNX model from: {}", model_path);

        let bytes = std::fs::read(model_path).map_err(|source| ModelLoadError::Io {
            path: model_path.to_string(),
            source,
        })?;

        let checksum = sha256_hex(&bytes);
        if let Some(expected) = expected_checksum {
            if !expected.eq_ignore_ascii_case(&checksum) {
                return Err(ModelLoadError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual: checksum,
                });
            }
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Backend(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Backend(format!("optimization level: {e}")))?
            .commit_from_memory(&bytes)
            .map_err(|e| ModelLoadError::Backend(format!("model load: {e}")))?;

        log::info!(
            "ONNX model loaded successfully (sha256 {})",
            &checksum[..12]
        );

        Ok(Self {
            session: Mutex::new(session),
            metadata: ModelMetadata {
                model_path: model_path.to_string(),
                model_type: "autoencoder".to_string(),
                input_features: FEATURE_COUNT,
                checksum_sha256: checksum,
                loaded_at: chrono::Utc::now(),
            },
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl ReconstructionModel for OnnxAutoencoder {
    fn reconstruct(&self, input: &[f64]) -> ScoringResult<Vec<f64>> {
        if input.len() != FEATURE_COUNT {
            return Err(ScoringError::Inference(format!(
                "input shape mismatch: got {}, model expects {}",
                input.len(),
                FEATURE_COUNT
            )));
        }

        // The autoencoder consumes the scaled vector as a length-24
        // sequence of single-feature timesteps: shape (1, 24, 1).
        let input_data: Vec<f32> = input.iter().map(|v| *v as f32).collect();
        let input_array = Array3::<f32>::from_shape_vec((1, FEATURE_COUNT, 1), input_data)
            .map_err(|e| ScoringError::Inference(format!("input tensor: {e}")))?;

        let mut session = self.session.lock();

        // Get output name BEFORE run to avoid borrow conflict
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ScoringError::Inference("model defines no output".to_string()))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ScoringError::Inference(format!("tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ScoringError::Inference(format!("inference failed: {e}")))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| ScoringError::Inference("no output from model".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ScoringError::Inference(format!("output extract: {e}")))?;

        if data.len() != FEATURE_COUNT {
            return Err(ScoringError::Inference(format!(
                "output shape mismatch: got {}, expected {}",
                data.len(),
                FEATURE_COUNT
            )));
        }

        Ok(data.iter().map(|v| *v as f64).collect())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

//! Error handling

use thiserror::Error;

use crate::constants::BATCH_SIZE;

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Failures surfaced to the caller of a single scoring call.
///
/// None of these are fatal to the process; the batch is discarded and the
/// error history is left untouched.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Batch length does not match the 24-sample contract.
    #[error("invalid batch size: expected {} samples, got {actual}", BATCH_SIZE)]
    InvalidBatchSize { actual: usize },

    /// A statistic came out non-finite (NaN/Inf leaked through the input).
    #[error("feature computation produced a non-finite value for '{feature}'")]
    FeatureComputation { feature: &'static str },

    /// The scaler or reconstruction model call itself failed.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Failures while loading the frozen scaler/model artifacts.
///
/// These abort startup: the scorer must not serve traffic without valid
/// models, so there is no retry path.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("bad artifact {path}: {reason}")]
    BadArtifact { path: String, reason: String },

    #[error("onnx runtime error: {0}")]
    Backend(String),
}

/// Visualization failure. Logged by the trigger, never propagated into a
/// verdict that has already been computed.
#[derive(Debug, Error)]
#[error("rendering failed: {0}")]
pub struct RenderError(pub String);

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError(err.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError(err.to_string())
    }
}

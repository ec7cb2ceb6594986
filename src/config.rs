//! Configuration module

use std::env;

use crate::constants::DEFAULT_RENDER_THRESHOLD;

/// Scoring service configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Path to the frozen ONNX autoencoder
    pub model_path: String,

    /// Path to the scaler parameter artifact (JSON)
    pub scaler_path: String,

    /// Optional SHA-256 the model file must match (hex)
    pub model_checksum: Option<String>,

    /// Optional cap on the error history; unbounded when unset.
    /// Capping changes the threshold from all-history to sliding-window.
    pub error_retention: Option<usize>,

    /// Buffered raw-sample count that triggers a render handoff
    pub render_threshold: usize,
}

impl ScoringConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("AUTOENCODER_MODEL_PATH")
                .unwrap_or_else(|_| "models/autoencoder.onnx".to_string()),

            scaler_path: env::var("SCALER_MODEL_PATH")
                .unwrap_or_else(|_| "models/scaler.json".to_string()),

            model_checksum: env::var("AUTOENCODER_MODEL_SHA256").ok(),

            error_retention: env::var("ERROR_RETENTION")
                .ok()
                .and_then(|v| v.parse().ok()),

            render_threshold: env::var("RENDER_BUFFER_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RENDER_THRESHOLD),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model_path: "models/autoencoder.onnx".to_string(),
            scaler_path: "models/scaler.json".to_string(),
            model_checksum: None,
            error_retention: None,
            render_threshold: DEFAULT_RENDER_THRESHOLD,
        }
    }
}

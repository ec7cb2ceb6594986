//! Model Module - Frozen Inference Artifacts & Error History
//!
//! The scaler and autoencoder are read-only after load; the error buffer
//! is the pipeline's single piece of mutable shared state.

pub mod buffer;
pub mod inference;
pub mod scaler;

// Re-export common types
pub use buffer::{ErrorBuffer, ThresholdStats};
pub use inference::{ModelMetadata, OnnxAutoencoder, ReconstructionModel};
pub use scaler::{FeatureScaler, ScalerArtifact, StandardScaler};

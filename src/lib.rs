//! VibraSense Core - Streaming Accelerometer Anomaly Scoring
//!
//! Ingests fixed-size batches of triaxial accelerometer readings, derives
//! a feature vector, scores it against a frozen autoencoder, and flags
//! statistical anomalies with a dynamically updated percentile threshold.
//!
//! Pipeline per batch:
//! validate -> extract -> scale -> reconstruct -> error -> threshold ->
//! verdict. Transport, storage and plot rendering live outside this crate
//! and talk to it through plain data and the [`viz::RenderSink`] trait.

pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod features;
pub mod model;
pub mod scoring;
pub mod service;
pub mod viz;

// Re-export the public surface
pub use batch::{SensorBatch, SensorSample};
pub use config::ScoringConfig;
pub use error::{ModelLoadError, RenderError, ScoringError, ScoringResult};
pub use features::FeatureVector;
pub use model::{
    ErrorBuffer, FeatureScaler, OnnxAutoencoder, ReconstructionModel, StandardScaler,
};
pub use scoring::{AnomalyScorer, AnomalyVerdict, ScorerStatus};
pub use service::ScoringService;
pub use viz::{RenderSink, SampleWindow, VisualizationTrigger, WindowWriter};

//! Central Configuration Constants
//!
//! Single source of truth for the scoring contract defaults.
//! To change the batch contract or threshold percentile, only edit this file.

/// Number of sensor samples in one scoring batch.
///
/// This is a fixed contract with the trained model, not a runtime knob:
/// the feature layout is derived from a 24-sample window.
pub const BATCH_SIZE: usize = 24;

/// Percentile of the error history used as the anomaly threshold.
pub const ERROR_PERCENTILE: f64 = 99.0;

/// Default number of buffered raw samples that triggers a render handoff.
pub const DEFAULT_RENDER_THRESHOLD: usize = 100;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "VibraSense";

//! Window Writer Sink
//!
//! File-backed `RenderSink`: dumps each handed-off window plus its verdict
//! as one JSON file, timestamped so an external plotter can pick them up
//! in order. This is the default collaborator when no real renderer is
//! wired in.

use std::fs::{self, File};
use std::path::PathBuf;

use crate::error::RenderError;
use crate::scoring::AnomalyVerdict;

use super::trigger::{RenderSink, SampleWindow};

pub struct WindowWriter {
    base_dir: PathBuf,
}

impl WindowWriter {
    pub fn new() -> Self {
        let base_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vibrasense")
            .join("windows");
        Self::from_path(base_dir)
    }

    pub fn from_path(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

impl Default for WindowWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for WindowWriter {
    fn render(&self, window: &SampleWindow, verdict: &AnomalyVerdict) -> Result<(), RenderError> {
        fs::create_dir_all(&self.base_dir)?;

        // timestamp format: YYYY-MM-DD-HHMMSS.mmm
        let filename = format!(
            "window-{}.json",
            verdict.timestamp.format("%Y-%m-%d-%H%M%S%.3f")
        );
        let path = self.base_dir.join(filename);

        let payload = serde_json::json!({
            "timestamp": verdict.timestamp,
            "reconstruction_error": verdict.reconstruction_error,
            "is_anomaly": verdict.is_anomaly,
            "window": window,
        });

        let file = File::create(&path)?;
        serde_json::to_writer(file, &payload)?;

        log::debug!("window written to {}", path.display());
        Ok(())
    }
}

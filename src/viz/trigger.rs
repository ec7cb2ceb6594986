//! Render trigger
//!
//! Per-channel accumulation of raw samples with a crossing check:
//! accumulate, trigger at the configured count, reset.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::batch::SensorBatch;
use crate::error::RenderError;
use crate::scoring::AnomalyVerdict;

/// Accumulated raw samples, split by channel the way plotters consume
/// them. Channels advance in lockstep, one entry per sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleWindow {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub magnitude: Vec<f64>,
}

impl SampleWindow {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn extend(&mut self, batch: &SensorBatch) {
        for sample in &batch.data {
            self.x.push(sample.x);
            self.y.push(sample.y);
            self.z.push(sample.z);
            self.magnitude.push(sample.magnitude);
        }
    }
}

/// External rendering collaborator. The window plus the verdict is enough
/// to draw and annotate a plot; what gets produced (PNG bytes, a file, a
/// dashboard push) is the sink's business.
pub trait RenderSink: Send + Sync {
    fn render(&self, window: &SampleWindow, verdict: &AnomalyVerdict) -> Result<(), RenderError>;
}

/// Decides when the accumulated window is worth rendering.
pub struct VisualizationTrigger {
    window: Mutex<SampleWindow>,
    threshold: usize,
    sink: Box<dyn RenderSink>,
}

impl VisualizationTrigger {
    pub fn new(threshold: usize, sink: Box<dyn RenderSink>) -> Self {
        Self {
            window: Mutex::new(SampleWindow::default()),
            threshold,
            sink,
        }
    }

    /// Fold one scored batch into the window; hand off and reset when the
    /// sample count reaches the threshold.
    ///
    /// Sink failures are logged and swallowed: the verdict was already
    /// returned to the caller and must not be invalidated here.
    pub fn observe(&self, batch: &SensorBatch, verdict: &AnomalyVerdict) {
        let window = {
            let mut guard = self.window.lock();
            guard.extend(batch);
            if guard.len() < self.threshold {
                return;
            }
            std::mem::take(&mut *guard)
        };

        log::debug!(
            "render threshold reached ({} samples), handing window to sink",
            window.len()
        );

        if let Err(e) = self.sink.render(&window, verdict) {
            log::warn!("rendering failed, verdict unaffected: {}", e);
        }
    }

    /// Samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.window.lock().len()
    }
}

//! Scoring Service - top-level wiring
//!
//! The infer path minus the transport: score a batch, feed the
//! visualization trigger, return the verdict. An HTTP layer (or any other
//! host) owns request validation and persistence and calls straight into
//! this.

use chrono::{DateTime, Utc};

use crate::batch::SensorBatch;
use crate::config::ScoringConfig;
use crate::error::{ModelLoadError, ScoringResult};
use crate::scoring::{AnomalyScorer, AnomalyVerdict, ScorerStatus};
use crate::viz::{RenderSink, VisualizationTrigger, WindowWriter};

pub struct ScoringService {
    scorer: AnomalyScorer,
    trigger: VisualizationTrigger,
}

impl ScoringService {
    pub fn new(scorer: AnomalyScorer, trigger: VisualizationTrigger) -> Self {
        Self { scorer, trigger }
    }

    /// Load the frozen artifacts and wire the default window-writer sink.
    /// Fails fast on any artifact problem.
    pub fn from_config(config: &ScoringConfig) -> Result<Self, ModelLoadError> {
        let scorer = AnomalyScorer::from_config(config)?;
        let trigger =
            VisualizationTrigger::new(config.render_threshold, Box::new(WindowWriter::new()));
        Ok(Self::new(scorer, trigger))
    }

    /// Same, with a caller-provided sink.
    pub fn from_config_with_sink(
        config: &ScoringConfig,
        sink: Box<dyn RenderSink>,
    ) -> Result<Self, ModelLoadError> {
        let scorer = AnomalyScorer::from_config(config)?;
        let trigger = VisualizationTrigger::new(config.render_threshold, sink);
        Ok(Self::new(scorer, trigger))
    }

    /// Score one batch, stamped with the current wall clock.
    pub fn infer(&self, batch: &SensorBatch) -> ScoringResult<AnomalyVerdict> {
        self.infer_at(batch, Utc::now())
    }

    /// Score one batch with a caller-supplied timestamp (used only to
    /// label the verdict). A scoring failure never reaches the trigger;
    /// a trigger/sink failure never reaches the verdict.
    pub fn infer_at(
        &self,
        batch: &SensorBatch,
        now: DateTime<Utc>,
    ) -> ScoringResult<AnomalyVerdict> {
        let verdict = self.scorer.score(batch, now)?;
        self.trigger.observe(batch, &verdict);
        Ok(verdict)
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    pub fn status(&self) -> ScorerStatus {
        self.scorer.status()
    }
}

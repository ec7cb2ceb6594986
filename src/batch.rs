//! Sensor data models
//!
//! Boundary types for one accelerometer reading and the fixed-size batch
//! the scorer consumes. The verbose field aliases match the upstream
//! gateway payload so batches deserialize from it directly.

use serde::{Deserialize, Serialize};

use crate::constants::BATCH_SIZE;
use crate::error::ScoringError;

/// One instant of triaxial accelerometer measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    #[serde(alias = "x_accelerometer_data")]
    pub x: f64,
    #[serde(alias = "y_accelerometer_data")]
    pub y: f64,
    #[serde(alias = "z_accelerometer_data")]
    pub z: f64,
    #[serde(alias = "acceleration_accelerometer_data")]
    pub magnitude: f64,
}

impl SensorSample {
    pub fn new(x: f64, y: f64, z: f64, magnitude: f64) -> Self {
        Self { x, y, z, magnitude }
    }
}

/// Ordered window of sensor samples scored as one unit.
///
/// The scoring contract requires exactly [`BATCH_SIZE`] samples; shorter or
/// longer batches are rejected before any pipeline state is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorBatch {
    pub data: Vec<SensorSample>,
}

impl SensorBatch {
    pub fn new(data: Vec<SensorSample>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check the fixed-size contract.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.data.len() != BATCH_SIZE {
            return Err(ScoringError::InvalidBatchSize {
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn xs(&self) -> Vec<f64> {
        self.data.iter().map(|s| s.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.data.iter().map(|s| s.y).collect()
    }

    pub fn zs(&self) -> Vec<f64> {
        self.data.iter().map(|s| s.z).collect()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.data.iter().map(|s| s.magnitude).collect()
    }
}

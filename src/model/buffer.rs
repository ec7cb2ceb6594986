//! Reconstruction Error Buffer
//!
//! Append-only history of per-batch reconstruction errors, and the
//! adaptive threshold computed over it: the 99th percentile of everything
//! recorded so far. The buffer is the only mutable shared state in the
//! scoring pipeline, so all access goes through one mutex.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::constants::ERROR_PERCENTILE;

/// Process-wide error history.
///
/// Unbounded by default, matching the all-history threshold semantics the
/// model was tuned against. An optional retention cap turns it into a
/// sliding window — that changes what the percentile ranges over, so it
/// is opt-in via [`ErrorBuffer::with_retention`].
pub struct ErrorBuffer {
    errors: Mutex<Vec<f64>>,
    retention: Option<usize>,
}

/// Threshold introspection for status surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdStats {
    pub current_threshold: Option<f64>,
    pub sample_count: usize,
    pub percentile: f64,
}

impl ErrorBuffer {
    /// Unbounded history.
    pub fn new() -> Self {
        Self {
            errors: Mutex::new(Vec::new()),
            retention: None,
        }
    }

    /// Keep only the most recent `cap` errors.
    pub fn with_retention(cap: usize) -> Self {
        Self {
            errors: Mutex::new(Vec::new()),
            retention: Some(cap),
        }
    }

    /// Append one reconstruction error.
    pub fn record(&self, error: f64) {
        let mut errors = self.errors.lock();
        Self::push(&mut errors, error, self.retention);
    }

    /// The 99th percentile over the entire recorded history, linear
    /// interpolation between closest ranks. `None` until something has
    /// been recorded.
    pub fn threshold(&self) -> Option<f64> {
        let errors = self.errors.lock();
        Self::percentile_of(&errors)
    }

    /// Append and compute the threshold in one critical section.
    ///
    /// The scoring path uses this so the freshly recorded error always
    /// participates in its own percentile, and no other caller can slip
    /// an append between the record and the lookup.
    pub fn record_and_threshold(&self, error: f64) -> f64 {
        let mut errors = self.errors.lock();
        Self::push(&mut errors, error, self.retention);
        // Non-empty after the push, so the percentile always exists.
        Self::percentile_of(&errors).unwrap_or(error)
    }

    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    /// Copy of the recorded history, in arrival order.
    pub fn snapshot(&self) -> Vec<f64> {
        self.errors.lock().clone()
    }

    pub fn stats(&self) -> ThresholdStats {
        let errors = self.errors.lock();
        ThresholdStats {
            current_threshold: Self::percentile_of(&errors),
            sample_count: errors.len(),
            percentile: ERROR_PERCENTILE,
        }
    }

    fn push(errors: &mut Vec<f64>, error: f64, retention: Option<usize>) {
        errors.push(error);
        if let Some(cap) = retention {
            while errors.len() > cap {
                errors.remove(0);
            }
        }
    }

    fn percentile_of(errors: &[f64]) -> Option<f64> {
        if errors.is_empty() {
            return None;
        }

        let mut sorted = errors.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(percentile(&sorted, ERROR_PERCENTILE))
    }
}

impl Default for ErrorBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Percentile with linear interpolation between closest ranks.
/// `sorted` must be sorted ascending and non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The trained autoencoder and the scaler artifact were fitted against this
//! exact ordering; a silent reorder would score garbage without erroring.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Current feature layout version.
/// MUST be incremented when layout changes.
pub const FEATURE_VERSION: u8 = 1;

/// Feature names in the exact order they appear in the vector.
/// This is the SINGLE SOURCE OF TRUTH for feature layout.
///
/// Four "last value" scalars first, then a five-statistic block per
/// channel, channels ordered x, magnitude, y, z.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Last-sample scalars (0-3) ===
    "magnitude_last",            // 0
    "x_last",                    // 1
    "y_last",                    // 2
    "z_last",                    // 3
    // === X channel statistics (4-8) ===
    "x_mean",                    // 4
    "x_std",                     // 5
    "x_last_minus_mean",         // 6
    "x_skewness",                // 7
    "x_kurtosis",                // 8
    // === Magnitude channel statistics (9-13) ===
    "magnitude_mean",            // 9
    "magnitude_std",             // 10
    "magnitude_last_minus_mean", // 11
    "magnitude_skewness",        // 12
    "magnitude_kurtosis",        // 13
    // === Y channel statistics (14-18) ===
    "y_mean",                    // 14
    "y_std",                     // 15
    "y_last_minus_mean",         // 16
    "y_skewness",                // 17
    "y_kurtosis",                // 18
    // === Z channel statistics (19-23) ===
    "z_mean",                    // 19
    "z_std",                     // 20
    "z_last_minus_mean",         // 21
    "z_skewness",                // 22
    "z_kurtosis",                // 23
];

/// Total number of features.
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 24;

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Compute the CRC32 hash of the feature layout.
/// Used to detect layout mismatches between artifacts and this build.
fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get the layout hash (computed once, cached).
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

/// Error when an artifact or vector was produced against a different layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version, self.expected_hash, self.actual_version, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches the current layout.
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Get feature index by name (O(n) but features are few).
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index.
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

//! Features Module - Feature Extraction Engine
//!
//! Everything between a raw sensor batch and the numeric vector handed to
//! the scaler: layout schema, per-channel statistics, extraction.

pub mod extract;
pub mod layout;
pub mod stats;
pub mod vector;


// Re-export common types
pub use extract::extract;
pub use layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use stats::ChannelStats;
pub use vector::FeatureVector;

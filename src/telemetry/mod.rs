//! Telemetry dataset and region aggregation.
//!
//! This module handles:
//! - Loading the read-only telemetry dataset at boot
//! - Sample statistics (mean, interpolated percentile, breach counts)
//! - Per-region aggregation for latency requests

pub mod aggregator;
pub mod stats;
pub mod types;

pub use aggregator::{Aggregator, RegionStats};
pub use stats::{count_above, mean, percentile};
pub use types::{Dataset, TelemetryRecord};

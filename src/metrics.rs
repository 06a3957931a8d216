//! Prometheus metrics for request and aggregation tracking.
//!
//! This module provides metrics for:
//! - Latency requests served and rejected
//! - Regions omitted because they have no records
//! - Aggregation compute time

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Aggregation compute time metric name.
pub const METRIC_COMPUTE_LATENCY: &str = "latency_compute_ms";
/// Latency requests served counter metric name.
pub const METRIC_REQUESTS: &str = "latency_requests_total";
/// Rejected latency requests counter metric name.
pub const METRIC_INVALID_REQUESTS: &str = "latency_invalid_requests_total";
/// Omitted regions counter metric name.
pub const METRIC_REGIONS_OMITTED: &str = "latency_regions_omitted_total";

/// Initialize all metric descriptions.
/// Call this once at startup, after a recorder is installed.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_COMPUTE_LATENCY,
        "Time to aggregate requested regions in milliseconds"
    );

    describe_counter!(METRIC_REQUESTS, "Total number of latency requests served");
    describe_counter!(
        METRIC_INVALID_REQUESTS,
        "Total number of latency requests rejected as invalid"
    );
    describe_counter!(
        METRIC_REGIONS_OMITTED,
        "Total number of requested regions omitted for lack of records"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Increment latency requests counter.
pub fn inc_requests() {
    counter!(METRIC_REQUESTS).increment(1);
}

/// Increment invalid requests counter.
pub fn inc_invalid_requests() {
    counter!(METRIC_INVALID_REQUESTS).increment(1);
}

/// Increment omitted regions counter.
pub fn inc_regions_omitted() {
    counter!(METRIC_REGIONS_OMITTED).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for region aggregation.
pub fn timer_compute() -> LatencyTimer {
    LatencyTimer::new(METRIC_COMPUTE_LATENCY)
}

//! Per-region summary statistics over the telemetry dataset.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::stats::{count_above, mean, percentile};
use super::types::Dataset;
use crate::metrics;

/// Percentile reported as `p95_latency`.
pub const P95: f64 = 95.0;

/// Summary statistics for one region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RegionStats {
    /// Mean latency in milliseconds.
    pub avg_latency: f64,
    /// 95th percentile latency in milliseconds (linear interpolation).
    pub p95_latency: f64,
    /// Mean uptime percentage.
    pub avg_uptime: f64,
    /// Records whose latency strictly exceeds the threshold.
    pub breaches: u64,
}

/// Computes region statistics over a shared, read-only dataset.
#[derive(Debug, Clone)]
pub struct Aggregator {
    dataset: Arc<Dataset>,
}

impl Aggregator {
    /// Create an aggregator over `dataset`.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    /// The underlying dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Statistics for a single region, or `None` if it has no records.
    pub fn region_stats(&self, region: &str, threshold: f64) -> Option<RegionStats> {
        let (latencies, uptimes): (Vec<f64>, Vec<f64>) = self
            .dataset
            .for_region(region)
            .map(|r| (r.latency_ms, r.uptime_pct))
            .unzip();

        Some(RegionStats {
            avg_latency: mean(&latencies)?,
            p95_latency: percentile(&latencies, P95)?,
            avg_uptime: mean(&uptimes)?,
            breaches: count_above(&latencies, threshold),
        })
    }

    /// Statistics for each requested region.
    ///
    /// Regions without any record are omitted from the result. Duplicate
    /// requests for a region collapse into one entry.
    #[instrument(skip(self), fields(requested = regions.len()))]
    pub fn compute(&self, regions: &[String], threshold: f64) -> BTreeMap<String, RegionStats> {
        let _timer = metrics::timer_compute();
        let mut result = BTreeMap::new();

        for region in regions {
            match self.region_stats(region, threshold) {
                Some(stats) => {
                    result.insert(region.clone(), stats);
                }
                None => {
                    debug!(region = %region, "no records for region, omitting");
                    metrics::inc_regions_omitted();
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryRecord;

    fn aggregator(records: Vec<TelemetryRecord>) -> Aggregator {
        Aggregator::new(Arc::new(Dataset::new(records)))
    }

    fn us_east_pair() -> Aggregator {
        aggregator(vec![
            TelemetryRecord::new("us-east", 100.0, 99.9),
            TelemetryRecord::new("us-east", 200.0, 99.5),
            TelemetryRecord::new("emea", 80.0, 98.0),
        ])
    }

    fn regions(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn computes_worked_example() {
        let result = us_east_pair().compute(&regions(&["us-east"]), 150.0);

        let stats = result["us-east"];
        assert_eq!(stats.avg_latency, 150.0);
        assert!((stats.p95_latency - 195.0).abs() < 1e-9);
        assert!((stats.avg_uptime - 99.7).abs() < 1e-9);
        assert_eq!(stats.breaches, 1);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn unknown_regions_are_omitted() {
        let result = us_east_pair().compute(&regions(&["us-east", "mars"]), 0.0);

        assert!(result.contains_key("us-east"));
        assert!(!result.contains_key("mars"));
    }

    #[test]
    fn empty_request_yields_empty_result() {
        assert!(us_east_pair().compute(&[], 150.0).is_empty());
    }

    #[test]
    fn threshold_equal_to_latency_is_not_a_breach() {
        let agg = aggregator(vec![TelemetryRecord::new("apac", 150.0, 99.0)]);

        assert_eq!(agg.region_stats("apac", 150.0).unwrap().breaches, 0);
        assert_eq!(agg.region_stats("apac", 149.0).unwrap().breaches, 1);
    }

    #[test]
    fn negative_and_huge_thresholds_are_valid() {
        let agg = us_east_pair();

        assert_eq!(agg.region_stats("us-east", -10.0).unwrap().breaches, 2);
        assert_eq!(agg.region_stats("us-east", 1e12).unwrap().breaches, 0);
    }

    #[test]
    fn single_record_p95_is_the_record() {
        let stats = us_east_pair().region_stats("emea", 0.0).unwrap();

        assert_eq!(stats.p95_latency, 80.0);
        assert_eq!(stats.avg_latency, 80.0);
        assert_eq!(stats.avg_uptime, 98.0);
    }

    #[test]
    fn duplicates_collapse_to_one_entry() {
        let agg = us_east_pair();
        let once = agg.compute(&regions(&["us-east"]), 150.0);
        let twice = agg.compute(&regions(&["us-east", "us-east"]), 150.0);

        assert_eq!(once, twice);
    }

    #[test]
    fn repeated_requests_serialize_identically() {
        let agg = us_east_pair();
        let request = regions(&["us-east", "emea", "mars"]);

        let first = serde_json::to_vec(&agg.compute(&request, 120.0)).unwrap();
        let second = serde_json::to_vec(&agg.compute(&request, 120.0)).unwrap();

        assert_eq!(first, second);
    }
}

//! Telemetry record and dataset types.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::StartupDataError;

/// Single pre-recorded telemetry sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryRecord {
    /// Region the sample belongs to.
    pub region: String,
    /// Measured latency in milliseconds.
    pub latency_ms: f64,
    /// Measured uptime percentage.
    pub uptime_pct: f64,
}

impl TelemetryRecord {
    /// Create a new record.
    pub fn new(region: impl Into<String>, latency_ms: f64, uptime_pct: f64) -> Self {
        Self {
            region: region.into(),
            latency_ms,
            uptime_pct,
        }
    }
}

/// Read-only collection of telemetry records, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<TelemetryRecord>,
}

impl Dataset {
    /// Build a dataset from records already in memory.
    pub fn new(records: Vec<TelemetryRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of records.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let records: Vec<TelemetryRecord> = serde_json::from_slice(bytes)?;
        Ok(Self::new(records))
    }

    /// Read and parse the telemetry file at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StartupDataError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| StartupDataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_slice(&bytes).map_err(|source| StartupDataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(records = dataset.len(), "telemetry dataset parsed");
        Ok(dataset)
    }

    /// All records in load order.
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct region identifiers, sorted.
    pub fn regions(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.region.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records belonging to `region`.
    pub fn for_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a TelemetryRecord> {
        self.records.iter().filter(move |r| r.region == region)
    }
}

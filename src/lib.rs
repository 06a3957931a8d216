//! Region latency telemetry aggregation service.
//!
//! Loads a fixed set of latency/uptime samples at startup and answers
//! `POST /api/latency` with per-region summary statistics:
//!
//! ```text
//! request:  {"regions": ["us-east"], "threshold_ms": 150}
//! dataset:  us-east 100ms 99.9%, us-east 200ms 99.5%
//! ─────────────────────────────────────────────────────
//! avg_latency: 150   p95_latency: 195
//! avg_uptime:  99.7  breaches:    1
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`telemetry`]: Dataset loading, statistics, and region aggregation
//! - [`api`]: HTTP API for latency, health, and metrics
//! - [`metrics`]: Prometheus counters and timers
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};

//! HTTP API handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::{InvalidRequestError, Result};
use crate::metrics;
use crate::telemetry::{Aggregator, Dataset, RegionStats};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Aggregator over the read-only dataset.
    pub aggregator: Aggregator,
    /// Prometheus render handle, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state over a loaded dataset.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            aggregator: Aggregator::new(dataset),
            prometheus: None,
        }
    }

    /// Load the dataset named by `config` and, when enabled, install the
    /// Prometheus recorder.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dataset = Dataset::load(&config.telemetry_path)?;
        if dataset.is_empty() {
            warn!("Telemetry dataset is empty; every region will be omitted");
        }
        info!(
            records = dataset.len(),
            regions = dataset.regions().len(),
            "Telemetry loaded"
        );

        let state = Self::new(Arc::new(dataset));
        if !config.enable_metrics {
            return Ok(state);
        }

        match metrics::install_prometheus() {
            Ok(handle) => Ok(state.with_prometheus(handle)),
            Err(e) => {
                warn!("Metrics disabled, failed to install recorder: {}", e);
                Ok(state)
            }
        }
    }

    /// Attach a Prometheus handle so `/metrics` is served.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Permissive cross-origin headers attached to every latency response.
pub fn cors_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
    ]
}

/// Latency aggregation request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct LatencyRequest {
    /// Regions to report on. Absent or null means none.
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    /// Breach threshold in milliseconds. Absent or null means 0.
    #[serde(default)]
    pub threshold_ms: Option<f64>,
}

impl LatencyRequest {
    /// Decode a request body, independent of its content type.
    pub fn from_body(body: &[u8]) -> std::result::Result<Self, InvalidRequestError> {
        serde_json::from_slice(body).map_err(InvalidRequestError::from_json)
    }

    /// Requested regions, empty when absent.
    pub fn regions(&self) -> &[String] {
        self.regions.as_deref().unwrap_or_default()
    }

    /// Breach threshold, 0 when absent.
    pub fn threshold(&self) -> f64 {
        self.threshold_ms.unwrap_or(0.0)
    }
}

/// Region name to statistics, ordered by region.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct LatencyResponse(pub BTreeMap<String, RegionStats>);

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
    /// Records loaded at startup.
    pub records: usize,
    /// Distinct regions loaded at startup.
    pub regions: usize,
}

/// Aggregate latency statistics for the requested regions.
#[utoipa::path(
    post,
    path = "/api/latency",
    request_body = LatencyRequest,
    responses(
        (status = 200, description = "Statistics per known region", body = LatencyResponse),
        (status = 400, description = "Malformed request body", body = crate::error::ErrorBody)
    )
)]
pub async fn latency(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<impl IntoResponse, InvalidRequestError> {
    let request = LatencyRequest::from_body(&body).inspect_err(|e| {
        warn!(error = %e, "rejecting latency request");
        metrics::inc_invalid_requests();
    })?;

    let result = state
        .aggregator
        .compute(request.regions(), request.threshold());
    metrics::inc_requests();

    debug!(
        requested = request.regions().len(),
        returned = result.len(),
        "latency request served"
    );

    Ok((cors_headers(), Json(LatencyResponse(result))))
}

/// Cross-origin preflight for the latency endpoint.
#[utoipa::path(
    options,
    path = "/api/latency",
    responses((status = 200, description = "Permissive CORS headers, empty body"))
)]
pub async fn latency_preflight() -> impl IntoResponse {
    (StatusCode::OK, cors_headers())
}

/// Health check handler - always returns 200 once serving.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = state.aggregator.dataset();
    Json(HealthResponse {
        status: "ok",
        records: dataset.len(),
        regions: dataset.regions().len(),
    })
}

/// Prometheus exposition handler.
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.prometheus {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

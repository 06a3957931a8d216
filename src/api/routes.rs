//! HTTP API route definitions.

use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{
    health, latency, latency_preflight, prometheus_metrics, AppState, LatencyRequest,
    LatencyResponse,
};
use crate::error::ErrorBody;
use crate::telemetry::RegionStats;

/// OpenAPI document for the latency endpoint.
#[derive(OpenApi)]
#[openapi(
    paths(super::handlers::latency, super::handlers::latency_preflight),
    components(schemas(LatencyRequest, LatencyResponse, RegionStats, ErrorBody))
)]
pub struct ApiDoc;

/// Permissive CORS policy for the read-only auxiliary routes.
///
/// The latency routes answer `OPTIONS` themselves so the preflight carries
/// exactly the headers from [`cors_headers`](super::handlers::cors_headers).
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let latency_route = post(latency).options(latency_preflight);

    // Latency endpoint, plus the short alias
    let latency_routes = Router::new()
        .route("/api/latency", latency_route.clone())
        .route("/latency", latency_route);

    let mut aux_routes = Router::new()
        // Health endpoint
        .route("/health", get(health))
        // OpenAPI document
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    if state.prometheus.is_some() {
        aux_routes = aux_routes.route("/metrics", get(prometheus_metrics));
    }

    latency_routes
        .merge(aux_routes.layer(cors_layer()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

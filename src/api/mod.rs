//! HTTP API module for the latency, health, and metrics endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, LatencyRequest, LatencyResponse};
pub use routes::{create_router, ApiDoc};

//! Integration tests for the region latency service.
//!
//! These tests load a dataset from a temporary file and drive the full
//! router, the same way the binary does at startup.
//! Run with: cargo test --test integration

use std::io::Write;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use region_latency::api::{create_router, AppState};
use region_latency::error::StartupDataError;
use region_latency::telemetry::{Aggregator, Dataset, RegionStats};

const TELEMETRY: &str = r#"[
    {"region": "us-east", "latency_ms": 100, "uptime_pct": 99.9},
    {"region": "us-east", "latency_ms": 200, "uptime_pct": 99.5},
    {"region": "apac", "latency_ms": 180.25, "uptime_pct": 97.2},
    {"region": "apac", "latency_ms": 140.5, "uptime_pct": 98.4},
    {"region": "apac", "latency_ms": 210.0, "uptime_pct": 99.1},
    {"region": "emea", "latency_ms": 95.0, "uptime_pct": 99.99}
]"#;

/// Write the fixture to a temporary file and load it like the server does.
fn load_fixture() -> (tempfile::NamedTempFile, Dataset) {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(TELEMETRY.as_bytes()).expect("write fixture");
    let dataset = Dataset::load(file.path()).expect("load fixture");
    (file, dataset)
}

async fn post(body: &'static str) -> (StatusCode, serde_json::Value) {
    let (_file, dataset) = load_fixture();
    let app = create_router(AppState::new(Arc::new(dataset)));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/latency")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn missing_telemetry_file_is_a_startup_error() {
    let err = Dataset::load("does-not-exist/q-vercel-latency.json").unwrap_err();
    assert!(matches!(err, StartupDataError::Read { .. }));
}

#[test]
fn malformed_telemetry_file_is_a_startup_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[{\"region\": \"apac\", \"latency_ms\": \"slow\"}]")
        .unwrap();

    let err = Dataset::load(file.path()).unwrap_err();
    assert!(matches!(err, StartupDataError::Parse { .. }));
}

#[test]
fn aggregator_over_loaded_file() {
    let (_file, dataset) = load_fixture();
    let aggregator = Aggregator::new(Arc::new(dataset));

    let regions = vec!["apac".to_string(), "emea".to_string(), "mars".to_string()];
    let result = aggregator.compute(&regions, 180.25);

    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["apac", "emea"]);

    // sorted apac = [140.5, 180.25, 210.0], rank 1.9 -> 180.25 + 29.75 * 0.9
    let apac = result["apac"];
    assert!((apac.p95_latency - 207.025).abs() < 1e-9);
    assert!((apac.avg_latency - 176.916_666_666_666_66).abs() < 1e-9);
    assert_eq!(apac.breaches, 1);

    assert_eq!(
        result["emea"],
        RegionStats {
            avg_latency: 95.0,
            p95_latency: 95.0,
            avg_uptime: 99.99,
            breaches: 0,
        }
    );
}

#[tokio::test]
async fn end_to_end_us_east_example() {
    let (status, json) = post(r#"{"regions": ["us-east"], "threshold_ms": 150}"#).await;

    assert_eq!(status, StatusCode::OK);
    let stats = &json["us-east"];
    assert_eq!(stats["avg_latency"].as_f64().unwrap(), 150.0);
    assert!((stats["p95_latency"].as_f64().unwrap() - 195.0).abs() < 1e-9);
    assert!((stats["avg_uptime"].as_f64().unwrap() - 99.7).abs() < 1e-9);
    assert_eq!(stats["breaches"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn threshold_defaults_to_zero() {
    let (status, json) = post(r#"{"regions": ["emea"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["emea"]["breaches"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn unknown_and_duplicate_regions() {
    let (status, json) = post(r#"{"regions": ["apac", "mars", "apac"], "threshold_ms": 0}"#).await;

    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["apac"]);
    assert_eq!(json["apac"]["breaches"].as_u64().unwrap(), 3);
}

#[tokio::test]
async fn identical_requests_are_byte_identical() {
    let body = r#"{"regions": ["us-east", "apac", "emea"], "threshold_ms": 150}"#;

    let (_, first) = post(body).await;
    let (_, second) = post(body).await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn wrong_field_type_is_rejected() {
    let (status, json) = post(r#"{"regions": [1, 2], "threshold_ms": 0}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

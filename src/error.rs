//! Unified error types for the latency service.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::error::Category;
use thiserror::Error;
use utoipa::ToSchema;

use crate::api::handlers::cors_headers;

/// Unified error type for configuration and startup.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration validation error.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Telemetry dataset could not be loaded.
    #[error("startup data error: {0}")]
    Data(#[from] StartupDataError),
}

/// Errors raised while loading the telemetry dataset at boot.
///
/// These are fatal: the server never binds its listener when one occurs.
#[derive(Error, Debug)]
pub enum StartupDataError {
    /// The telemetry file could not be read.
    #[error("failed to read telemetry file {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The telemetry file is not a JSON array of records.
    #[error("failed to parse telemetry file {}: {source}", path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Errors raised while decoding a latency request body.
#[derive(Error, Debug)]
pub enum InvalidRequestError {
    /// Body is not syntactically valid JSON.
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),

    /// Body is JSON but a field has the wrong shape.
    #[error("invalid request field: {0}")]
    InvalidField(String),
}

impl InvalidRequestError {
    /// Classify a `serde_json` decoding failure.
    pub fn from_json(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::InvalidField(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => {
                Self::MalformedJson(err.to_string())
            }
        }
    }
}

/// Error body returned with 4xx responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for InvalidRequestError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, cors_headers(), Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;

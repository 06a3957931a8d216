//! Application configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, ServiceError};

/// Log directive used when verbose logging is requested.
pub const VERBOSE_LOG_DIRECTIVE: &str = "region_latency=debug,info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Data ===
    /// Telemetry JSON file, relative to the working directory.
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: PathBuf,

    // === Server Configuration ===
    /// Bind address for the HTTP server.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Install the Prometheus recorder and expose `/metrics`.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_telemetry_path() -> PathBuf {
    PathBuf::from("q-vercel-latency.json")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telemetry_path: default_telemetry_path(),
            host: default_host(),
            port: default_port(),
            enable_metrics: default_true(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        if self.telemetry_path.as_os_str().is_empty() {
            return Err(ServiceError::InvalidConfig(
                "TELEMETRY_PATH must not be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(ServiceError::InvalidConfig("PORT must be non-zero".to_string()));
        }

        self.bind_addr()?;
        Ok(())
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ServiceError::InvalidConfig(format!("HOST is not a valid IP address: {}", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Tracing filter directive: `RUST_LOG`, unless verbose logging is on
    /// through `VERBOSE` or the `--verbose` flag.
    pub fn log_directive(&self, verbose_flag: bool) -> &str {
        if verbose_flag || self.verbose {
            VERBOSE_LOG_DIRECTIVE
        } else {
            &self.rust_log
        }
    }
}

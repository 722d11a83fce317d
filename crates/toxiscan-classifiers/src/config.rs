//! Configuration for the prediction service gateway

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toxiscan_core::{Error, Result};

/// Prediction service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Full URL of the prediction endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Largest response body accepted from the service, in bytes
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    /// Gateway name used in logs
    #[serde(default = "default_name")]
    pub name: String,
}

impl GatewayConfig {
    /// Create a config pointing at the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parse and check the endpoint URL and timeout
    pub fn validate(&self) -> Result<Url> {
        if self.timeout_ms == 0 {
            return Err(Error::config("gateway timeout_ms must be greater than zero"));
        }
        if self.max_response_bytes == 0 {
            return Err(Error::config(
                "gateway max_response_bytes must be greater than zero",
            ));
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| Error::config(format!("invalid endpoint '{}': {}", self.endpoint, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::config(format!(
                "endpoint scheme must be http or https, got '{}'",
                other
            ))),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            name: default_name(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000/predict".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_response_bytes() -> usize {
    64 * 1024
}

fn default_name() -> String {
    "prediction-service".to_string()
}

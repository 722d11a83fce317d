//! Prediction service gateway
//!
//! Sends one comment to the external classifier and hands back its raw
//! payload. Transport detail never crosses this boundary: every failure is
//! reported as either `UpstreamUnavailable` or `UpstreamError`.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use toxiscan_core::{Error, RawPrediction, Result};
use tracing::{debug, warn};

/// Trait for anything that can produce a raw toxicity prediction
#[async_trait]
pub trait PredictionGateway: Send + Sync {
    /// Request a prediction for an already validated comment
    async fn predict(&self, comment: &str) -> Result<RawPrediction>;

    /// Get the gateway name
    fn name(&self) -> &str;
}

/// Request body sent to the prediction service
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    comment: &'a str,
}

/// Gateway that talks to the prediction service over HTTP
pub struct HttpPredictionGateway {
    name: String,
    endpoint: Url,
    max_response_bytes: usize,
    client: reqwest::Client,
}

impl HttpPredictionGateway {
    /// Build a gateway from configuration
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let endpoint = config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: config.name.clone(),
            endpoint,
            max_response_bytes: config.max_response_bytes,
            client,
        })
    }

    /// Endpoint this gateway posts to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionGateway for HttpPredictionGateway {
    async fn predict(&self, comment: &str) -> Result<RawPrediction> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&PredictRequest { comment })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(gateway = %self.name, %status, "prediction service returned an error status");
            return Err(status_error(status));
        }

        let body = read_capped(response, self.max_response_bytes).await?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| Error::upstream(format!("response body is not JSON: {}", e)))?;

        debug!(
            gateway = %self.name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "prediction received"
        );

        Ok(RawPrediction::from_value(value))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Read the response body, refusing anything larger than `limit` bytes
async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>> {
    let too_large = || Error::upstream(format!("response body exceeds {} bytes", limit));

    if response
        .content_length()
        .is_some_and(|length| length > limit as u64)
    {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Map a reqwest failure onto the gateway taxonomy
fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        warn!("prediction service unreachable: {}", err);
        Error::unavailable(err.to_string())
    } else {
        warn!("prediction service transport error: {}", err);
        Error::upstream(err.to_string())
    }
}

/// Gateway and overload statuses mean the service is not there right now;
/// anything else is the service answering badly.
fn status_error(status: StatusCode) -> Error {
    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            Error::unavailable(format!("status {}", status))
        }
        _ => Error::upstream(format!("status {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toxiscan_core::ErrorKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::SERVICE_UNAVAILABLE).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(
            status_error(StatusCode::GATEWAY_TIMEOUT).kind(),
            ErrorKind::UpstreamUnavailable
        );
        assert_eq!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR).kind(),
            ErrorKind::UpstreamError
        );
        assert_eq!(status_error(StatusCode::NOT_FOUND).kind(), ErrorKind::UpstreamError);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GatewayConfig::new("localhost:5000");
        assert!(HttpPredictionGateway::new(&config).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(PredictRequest { comment: "hi" }).unwrap();
        assert_eq!(body, serde_json::json!({ "comment": "hi" }));
    }
}

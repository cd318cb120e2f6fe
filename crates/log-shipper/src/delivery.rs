// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! A single HTTP delivery attempt.
//!
//! ```text
//!   Payload ──> JSON ──> gzip? ──> POST <api_url> ──> 202? ──> Ok
//!                                        │
//!                                        └─> status / transport / timeout error
//! ```

use crate::config::ShipperConfig;
use crate::error::DeliveryError;
use crate::record::Payload;
use flate2::{write::GzEncoder, Compression};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// The only status code treated as a successful delivery.
pub const EXPECTED_STATUS_CODE: StatusCode = StatusCode::ACCEPTED;

const API_KEY_HEADER: &str = "Api-Key";

#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    config: Arc<ShipperConfig>,
    headers: HeaderMap,
    timeout: Duration,
}

impl DeliveryClient {
    pub fn new(
        client: reqwest::Client,
        config: Arc<ShipperConfig>,
    ) -> Result<Self, DeliveryError> {
        let headers = build_headers(&config)?;
        let timeout = config.effective_timeout();
        Ok(DeliveryClient {
            client,
            config,
            headers,
            timeout,
        })
    }

    /// Performs one POST of `payload` and classifies the outcome.
    ///
    /// The timeout covers connecting and waiting for response headers. When it
    /// expires the in-flight request future is dropped, which aborts the
    /// connection.
    pub async fn send(&self, payload: &Payload) -> Result<(), DeliveryError> {
        let body = self.encode(payload)?;
        let time = Instant::now();

        let request = self
            .client
            .post(self.config.api_url.clone())
            .headers(self.headers.clone())
            .body(body)
            .send();

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result?,
            Err(_) => return Err(DeliveryError::Timeout),
        };

        let status = response.status();
        debug!(
            "Delivery of {} record(s) answered {} after {} ms",
            payload.record_count(),
            status.as_u16(),
            time.elapsed().as_millis()
        );

        if status == EXPECTED_STATUS_CODE {
            Ok(())
        } else {
            Err(DeliveryError::UnexpectedStatus(status.as_u16()))
        }
    }

    /// Request body for `payload`, gzip-compressed when enabled.
    pub fn encode(&self, payload: &Payload) -> Result<Vec<u8>, DeliveryError> {
        let json = payload
            .to_json()
            .map_err(|e| DeliveryError::Payload(e.to_string()))?;

        if !self.config.compression {
            return Ok(json);
        }

        gzip(&json).map_err(|e| DeliveryError::Payload(format!("gzip failed: {e}")))
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

fn build_headers(config: &ShipperConfig) -> Result<HeaderMap, DeliveryError> {
    let mut headers = HeaderMap::new();
    let api_key = HeaderValue::from_str(&config.api_key)
        .map_err(|e| DeliveryError::Payload(format!("invalid API key header: {e}")))?;
    headers.insert(API_KEY_HEADER, api_key);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if config.compression {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    }
    Ok(headers)
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

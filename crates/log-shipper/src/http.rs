// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::ShipperConfig;
use crate::error::ShipperError;
use core::time::Duration;
use tracing::debug;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(270);
const TCP_KEEPALIVE: Duration = Duration::from_secs(120);

/// Builds the HTTP client shared by every delivery attempt of one shipper.
///
/// The per-attempt timeout is not set here; it is enforced around each send
/// so that it only bounds the wait for response headers.
pub fn get_client(config: &ShipperConfig) -> Result<reqwest::Client, ShipperError> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE);

    if let Some(https_proxy) = &config.https_proxy {
        debug!("Using HTTPS proxy for log delivery");
        let proxy = reqwest::Proxy::https(https_proxy)
            .map_err(|e| ShipperError::Client(format!("invalid HTTPS proxy: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ShipperError::Client(e.to_string()))
}

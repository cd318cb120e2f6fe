// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use reqwest::header::HeaderValue;
use reqwest::Url;
use std::env;
use std::time::Duration;

/// Per-attempt timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Delivery configuration, fixed for the lifetime of a shipper.
#[derive(Debug, Clone)]
pub struct ShipperConfig {
    /// Intake endpoint; scheme selects plain HTTP or HTTPS
    pub api_url: Url,
    /// Static credential sent as the `Api-Key` header
    pub api_key: String,
    /// Bound on the wait for response headers, per attempt
    pub timeout: Duration,
    /// Additional attempts after the first failure
    pub retries: u32,
    /// Gzip request bodies
    pub compression: bool,
    /// Flush once this many records are buffered
    pub batch_size: Option<usize>,
    /// Flush this long after the first record lands in an empty batch
    pub batch_timeout: Option<Duration>,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
}

impl ShipperConfig {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        let api_url = Url::parse(api_url).map_err(|e| ConfigError::InvalidUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;

        let config = Self {
            api_url,
            api_key: api_key.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
            compression: false,
            batch_size: None,
            batch_timeout: None,
            https_proxy: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("LOG_SHIPPER_API_URL")
            .map_err(|_| ConfigError::Missing("LOG_SHIPPER_API_URL"))?;
        let api_key = env::var("LOG_SHIPPER_API_KEY")
            .map_err(|_| ConfigError::Missing("LOG_SHIPPER_API_KEY"))?;

        let mut config = Self::new(&api_url, &api_key)?;

        config.timeout = env::var("LOG_SHIPPER_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis);
        config.retries = env::var("LOG_SHIPPER_RETRIES")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(0);
        config.compression = env::var("LOG_SHIPPER_COMPRESSION")
            .map(|val| matches!(val.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        config.batch_size = env::var("LOG_SHIPPER_BATCH_SIZE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok());
        config.batch_timeout = env::var("LOG_SHIPPER_BATCH_TIMEOUT_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_millis);
        config.https_proxy = env::var("LOG_SHIPPER_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    #[must_use]
    pub fn with_batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = Some(batch_timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key"));
        }

        if let Err(e) = HeaderValue::from_str(&self.api_key) {
            return Err(ConfigError::Invalid(format!(
                "api_key is not a valid header value: {e}"
            )));
        }

        match self.api_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::InvalidUrl {
                    url: self.api_url.to_string(),
                    reason: format!("unsupported scheme '{other}'"),
                })
            }
        }

        if self.api_url.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::InvalidUrl {
                url: self.api_url.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(())
    }

    /// Batching is active iff the count threshold is above one or a time
    /// threshold is set.
    #[must_use]
    pub fn is_batching(&self) -> bool {
        self.batch_size.is_some_and(|size| size > 1) || self.effective_batch_timeout().is_some()
    }

    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        match self.batch_size {
            Some(size) if size > 0 => size,
            _ => usize::MAX,
        }
    }

    #[must_use]
    pub fn effective_batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout.filter(|timeout| !timeout.is_zero())
    }

    #[must_use]
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config() -> ShipperConfig {
        ShipperConfig::new("https://log-api.example.com/log/v1", "test-key")
            .expect("valid config")
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.retries, 0);
        assert!(!config.compression);
        assert!(!config.is_batching());
        assert_eq!(config.effective_batch_size(), usize::MAX);
    }

    #[test]
    fn test_is_batching() {
        assert!(!config().with_batch_size(1).is_batching());
        assert!(!config().with_batch_size(0).is_batching());
        assert!(config().with_batch_size(2).is_batching());
        assert!(!config().with_batch_timeout(Duration::ZERO).is_batching());
        assert!(config()
            .with_batch_timeout(Duration::from_millis(10))
            .is_batching());
        assert!(config()
            .with_batch_size(1)
            .with_batch_timeout(Duration::from_millis(10))
            .is_batching());
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = config().with_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let err = ShipperConfig::new("ftp://example.com/logs", "key").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_invalid_url() {
        let err = ShipperConfig::new("not a url", "key").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let err = ShipperConfig::new("https://example.com/logs", "  ").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_key")));
    }

    #[test]
    fn test_rejects_api_key_unusable_as_header() {
        let err = ShipperConfig::new("https://example.com/logs", "bad\nkey").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let mut config = ShipperConfig::new("https://example.com/logs", "key").unwrap();
        config.api_key = "key\u{7f}".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("LOG_SHIPPER_API_URL", "http://localhost:8080/logs");
        env::set_var("LOG_SHIPPER_API_KEY", "env-key");
        env::set_var("LOG_SHIPPER_TIMEOUT_MS", "250");
        env::set_var("LOG_SHIPPER_RETRIES", "3");
        env::set_var("LOG_SHIPPER_COMPRESSION", "true");
        env::set_var("LOG_SHIPPER_BATCH_SIZE", "10");
        env::set_var("LOG_SHIPPER_BATCH_TIMEOUT_MS", "not-a-number");

        let config = ShipperConfig::from_env().expect("valid env config");
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/logs");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.retries, 3);
        assert!(config.compression);
        assert_eq!(config.batch_size, Some(10));
        assert_eq!(config.batch_timeout, None);

        for key in [
            "LOG_SHIPPER_API_URL",
            "LOG_SHIPPER_API_KEY",
            "LOG_SHIPPER_TIMEOUT_MS",
            "LOG_SHIPPER_RETRIES",
            "LOG_SHIPPER_COMPRESSION",
            "LOG_SHIPPER_BATCH_SIZE",
            "LOG_SHIPPER_BATCH_TIMEOUT_MS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_url() {
        env::remove_var("LOG_SHIPPER_API_URL");
        env::set_var("LOG_SHIPPER_API_KEY", "env-key");
        let err = ShipperConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("LOG_SHIPPER_API_URL")));
        env::remove_var("LOG_SHIPPER_API_KEY");
    }
}

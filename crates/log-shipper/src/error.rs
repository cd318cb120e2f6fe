// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for configuration, engine construction and delivery attempts.

/// Outcome of a failed delivery attempt.
///
/// The `Display` output is what observers see on the failure event, so the
/// messages are part of the public contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The endpoint answered with anything other than `202 Accepted`.
    #[error("Received unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// No response headers arrived within the configured per-attempt timeout.
    #[error("Request timeout while sending logs")]
    Timeout,

    /// Connection level failure (DNS, refused, reset, TLS).
    #[error("{0}")]
    Transport(String),

    /// The payload could not be turned into a request body.
    #[error("Failed to prepare payload: {0}")]
    Payload(String),
}

impl DeliveryError {
    /// Status code carried by the error, if the endpoint answered at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        Self::Transport(err.to_string())
    }
}

/// Errors found while building or validating a [`crate::config::ShipperConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors returned when constructing a [`crate::shipper::LogShipper`].
#[derive(Debug, thiserror::Error)]
pub enum ShipperError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Log shipper must be created inside a Tokio runtime")]
    NoRuntime,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

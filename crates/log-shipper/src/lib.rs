// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batching, retrying delivery of structured log records to an HTTP intake.
//!
//! ```rust,ignore
//! use log_shipper::{config::ShipperConfig, record::Record, shipper::LogShipper};
//!
//! let config = ShipperConfig::new("https://log-api.example.com/log/v1", "api-key")?
//!     .with_batch_size(100)
//!     .with_retries(3);
//! let (shipper, mut events) = LogShipper::new(config)?;
//!
//! shipper.submit(Record::from_message("hello"));
//! shipper.drain().await;
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod batch;
pub mod config;
pub mod delivery;
pub mod error;
pub mod events;
pub mod http;
pub mod in_flight;
pub mod record;
pub mod retry;
pub mod shipper;

pub use config::ShipperConfig;
pub use error::{ConfigError, DeliveryError, ShipperError};
pub use events::{DeliveryEvent, EventReceiver};
pub use record::{Payload, Record};
pub use shipper::LogShipper;

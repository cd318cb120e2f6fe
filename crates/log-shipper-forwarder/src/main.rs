// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use log_shipper::{DeliveryError, DeliveryEvent, EventReceiver, LogShipper, Record, ShipperConfig};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("LOG_SHIPPER_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match ShipperConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating log shipper config: {e}");
            return;
        }
    };

    let (shipper, events) = match LogShipper::new(config) {
        Ok(created) => created,
        Err(e) => {
            error!("Error creating log shipper: {e}");
            return;
        }
    };

    let reporter = tokio::spawn(report_events(events));

    info!("Forwarding stdin to {}", shipper.config().api_url);

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Some(record) = parse_line(&line) {
                        shipper.submit(record);
                    }
                }
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read stdin: {e}");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, draining pending logs");
                break;
            }
        }
    }

    shipper.drain().await;
    drop(shipper);
    if let Err(e) = reporter.await {
        error!("Event reporter failed: {e}");
    }
    info!("All logs settled, exiting");
}

/// JSON objects are forwarded as-is; any other non-blank line becomes a
/// `message` record.
fn parse_line(line: &str) -> Option<Record> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => Some(Record::try_from(value).unwrap_or_else(|_| Record::from_message(trimmed))),
        Err(_) => Some(Record::from_message(trimmed)),
    }
}

async fn report_events(mut events: EventReceiver) {
    let mut delivered = 0_u64;
    let mut failed = 0_u64;
    while let Some(event) = events.recv().await {
        match event {
            DeliveryEvent::Success(_) => delivered += 1,
            DeliveryEvent::Failure(e) => {
                failed += 1;
                error!("{}", failure_message(&e));
            }
        }
    }
    debug!("Delivered {delivered} record(s), {failed} failed attempt(s)");
}

fn failure_message(e: &DeliveryError) -> String {
    match e.status_code() {
        Some(status) => format!("Log delivery attempt rejected with status {status}"),
        None => format!("Log delivery attempt failed: {e}"),
    }
}

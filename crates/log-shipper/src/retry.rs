// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::delivery::DeliveryClient;
use crate::events::EventSender;
use crate::record::Payload;
use tracing::{debug, error, warn};

/// Drives a linear chain of delivery attempts for one payload.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    client: DeliveryClient,
    events: EventSender,
    max_retries: u32,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(client: DeliveryClient, events: EventSender, max_retries: u32) -> Self {
        RetryPolicy {
            client,
            events,
            max_retries,
        }
    }

    /// Runs the chain to a terminal outcome and reports whether it succeeded.
    ///
    /// Each failed attempt is reported as soon as it is observed, including
    /// the ones that get retried. The next attempt starts right after.
    pub async fn attempt(&self, payload: Payload) -> bool {
        let mut retry_count = 0;

        loop {
            match self.client.send(&payload).await {
                Ok(()) => {
                    debug!(
                        "Delivered {} record(s) after {} attempt(s)",
                        payload.record_count(),
                        retry_count + 1
                    );
                    for record in payload.into_records() {
                        self.events.success(record);
                    }
                    return true;
                }
                Err(e) => {
                    self.events.failure(e.clone());

                    if retry_count >= self.max_retries {
                        error!(
                            "Dropping {} record(s) after {} attempt(s): {}",
                            payload.record_count(),
                            retry_count + 1,
                            e
                        );
                        return false;
                    }

                    retry_count += 1;
                    warn!(
                        "Delivery attempt failed, retrying ({}/{}): {}",
                        retry_count, self.max_retries, e
                    );
                }
            }
        }
    }
}

// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The delivery engine facade.
//!
//! ```text
//!   submit ──> stamp timestamp ──┬─> (unbatched) ─────────────┐
//!                                └─> BatchQueue ─ count/timer ┤
//!                                                             v
//!                              InFlightRegistry <── register ─ RetryPolicy ──> DeliveryClient
//!                                     ^                            │
//!   drain ── flush + settled ─────────┘                            └──> DeliveryEvent
//! ```
//!
//! Each [`LogShipper`] owns its own batch and registry; clones share them.

use crate::batch::{BatchQueue, Flushed};
use crate::config::ShipperConfig;
use crate::delivery::DeliveryClient;
use crate::error::ShipperError;
use crate::events::{EventReceiver, EventSender};
use crate::http::get_client;
use crate::in_flight::{InFlightGuard, InFlightRegistry};
use crate::record::{Payload, Record};
use crate::retry::RetryPolicy;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Debug)]
struct Inner {
    config: Arc<ShipperConfig>,
    batching: bool,
    queue: BatchQueue,
    registry: InFlightRegistry,
    retry: Arc<RetryPolicy>,
    runtime: Handle,
}

#[derive(Debug, Clone)]
pub struct LogShipper {
    inner: Arc<Inner>,
}

impl LogShipper {
    /// Creates a shipper and the receiver of its delivery events.
    ///
    /// Must be called from within a Tokio runtime; deliveries and batch
    /// timers are spawned onto it.
    pub fn new(config: ShipperConfig) -> Result<(Self, EventReceiver), ShipperError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| ShipperError::NoRuntime)?;

        let client = get_client(&config)?;
        let config = Arc::new(config);
        let delivery = DeliveryClient::new(client, Arc::clone(&config))
            .map_err(|e| ShipperError::Client(e.to_string()))?;

        let (events, rx) = EventSender::channel();
        let retry = Arc::new(RetryPolicy::new(delivery, events, config.retries));
        let queue = BatchQueue::new(
            config.effective_batch_size(),
            config.effective_batch_timeout(),
        );

        debug!(
            "Log shipper created for {} (batching: {})",
            config.api_url,
            config.is_batching()
        );

        let inner = Inner {
            batching: config.is_batching(),
            config,
            queue,
            registry: InFlightRegistry::new(),
            retry,
            runtime,
        };
        Ok((
            LogShipper {
                inner: Arc::new(inner),
            },
            rx,
        ))
    }

    /// Fire-and-forget submission. Never blocks and never fails; outcomes are
    /// only visible as delivery events.
    pub fn submit(&self, mut record: Record) {
        record.ensure_timestamp();

        if !self.inner.batching {
            // Registered before spawning so a concurrent drain always sees it.
            let guard = self.inner.registry.register();
            self.dispatch(Payload::Single(record), guard);
            return;
        }

        let full = self.inner.queue.push(record, &self.inner.registry, |generation, timeout| {
            self.arm_timer(generation, timeout)
        });

        if let Some(Flushed { records, guard }) = full {
            debug!("Batch size reached, flushing {} record(s)", records.len());
            self.dispatch(Payload::Batch(records), guard);
        }
    }

    /// Dispatches whatever is buffered as one batch and returns how many
    /// records that was. Safe to call at any time, including when empty.
    pub fn flush(&self) -> usize {
        match self.inner.queue.take(&self.inner.registry) {
            Some(Flushed { records, guard }) => {
                let flushed = records.len();
                debug!("Flushing {flushed} buffered record(s)");
                self.dispatch(Payload::Batch(records), guard);
                flushed
            }
            None => 0,
        }
    }

    /// Flushes and waits until nothing is buffered and no delivery chain is
    /// outstanding. Chains started while waiting are waited for as well.
    pub async fn drain(&self) {
        loop {
            let flushed = self.flush();
            let in_flight = self.inner.registry.len();
            if flushed == 0 && in_flight == 0 {
                debug!("Log shipper drained");
                return;
            }
            debug!("Draining: flushed {flushed} record(s), {in_flight} delivery chain(s) in flight");
            self.inner.registry.settled().await;
        }
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.queue.len()
    }

    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.inner.registry.len()
    }

    #[must_use]
    pub fn is_batching(&self) -> bool {
        self.inner.batching
    }

    #[must_use]
    pub fn config(&self) -> &ShipperConfig {
        &self.inner.config
    }

    fn dispatch(&self, payload: Payload, guard: InFlightGuard) {
        let retry = Arc::clone(&self.inner.retry);
        self.inner.runtime.spawn(async move {
            let _guard = guard;
            retry.attempt(payload).await;
        });
    }

    fn arm_timer(&self, generation: u64, timeout: std::time::Duration) -> AbortHandle {
        let shipper = self.clone();
        self.inner
            .runtime
            .spawn(async move {
                tokio::time::sleep(timeout).await;
                let expired = shipper
                    .inner
                    .queue
                    .take_expired(generation, &shipper.inner.registry);
                if let Some(Flushed { records, guard }) = expired {
                    debug!("Batch timeout reached, flushing {} record(s)", records.len());
                    shipper.dispatch(Payload::Batch(records), guard);
                }
            })
            .abort_handle()
    }
}

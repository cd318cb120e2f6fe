// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::DeliveryError;
use crate::record::Record;
use tokio::sync::mpsc;
use tracing::debug;

/// Observable outcome of a delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryEvent {
    /// One per record of a payload whose chain ended in success.
    Success(Record),
    /// One per failed attempt, retried or terminal.
    Failure(DeliveryError),
}

impl DeliveryEvent {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

pub type EventReceiver = mpsc::UnboundedReceiver<DeliveryEvent>;

/// Sending half of the event channel. Never blocks.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<DeliveryEvent>,
}

impl EventSender {
    #[must_use]
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, record: Record) {
        self.emit(DeliveryEvent::Success(record));
    }

    pub fn failure(&self, error: DeliveryError) {
        self.emit(DeliveryEvent::Failure(error));
    }

    fn emit(&self, event: DeliveryEvent) {
        if self.tx.send(event).is_err() {
            debug!("Delivery event dropped: receiver closed");
        }
    }
}

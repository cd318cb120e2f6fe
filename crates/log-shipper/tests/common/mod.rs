// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

pub mod mock_server;

use log_shipper::{DeliveryEvent, EventReceiver};

/// Collects every event already sent on the channel.
pub fn collect_events(rx: &mut EventReceiver) -> Vec<DeliveryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn count_successes(events: &[DeliveryEvent]) -> usize {
    events.iter().filter(|event| event.is_success()).count()
}

pub fn failure_message(event: &DeliveryEvent) -> String {
    match event {
        DeliveryEvent::Failure(error) => error.to_string(),
        DeliveryEvent::Success(_) => panic!("expected a failure event"),
    }
}

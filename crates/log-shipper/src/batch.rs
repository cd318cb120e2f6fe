// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Buffering of records until a count or time threshold is reached.
//!
//! The queue only owns state. Spawning the flush timer and dispatching flushed
//! records is left to the caller, which passes an `arm` closure to [`BatchQueue::push`].
//! Records leaving the queue are registered in flight before the queue lock is
//! released, so they are always accounted for in one place or the other.

use crate::in_flight::{InFlightGuard, InFlightRegistry};
use crate::record::Record;
use std::mem;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::AbortHandle;

#[derive(Debug, Default)]
struct PendingBatch {
    records: Vec<Record>,
    /// Only set while `records` is non-empty and no flush happened since.
    timer: Option<AbortHandle>,
    /// Bumped on every take, so an expired timer can tell whether the batch
    /// it was armed for is still the current one.
    generation: u64,
}

/// Records taken out of the queue together with their in-flight entry.
#[derive(Debug)]
pub struct Flushed {
    pub records: Vec<Record>,
    pub guard: InFlightGuard,
}

#[derive(Debug)]
pub struct BatchQueue {
    state: Mutex<PendingBatch>,
    batch_size: usize,
    batch_timeout: Option<Duration>,
}

impl BatchQueue {
    #[must_use]
    pub fn new(batch_size: usize, batch_timeout: Option<Duration>) -> Self {
        BatchQueue {
            state: Mutex::new(PendingBatch::default()),
            batch_size: batch_size.max(1),
            batch_timeout,
        }
    }

    /// Appends `record`. Returns the whole batch when the count threshold is
    /// reached. Otherwise, if a time threshold is configured and no timer is
    /// armed yet, calls `arm(generation, timeout)` to start one.
    pub fn push<F>(&self, record: Record, registry: &InFlightRegistry, arm: F) -> Option<Flushed>
    where
        F: FnOnce(u64, Duration) -> AbortHandle,
    {
        #[allow(clippy::expect_used)]
        let mut state = self.state.lock().expect("lock poisoned");
        state.records.push(record);

        if state.records.len() >= self.batch_size {
            return Self::take_locked(&mut state, registry);
        }

        if let Some(timeout) = self.batch_timeout {
            if state.timer.is_none() {
                let generation = state.generation;
                state.timer = Some(arm(generation, timeout));
            }
        }
        None
    }

    /// Cancels any armed timer and takes the buffered records, leaving the
    /// queue empty. Returns `None` when nothing was buffered.
    pub fn take(&self, registry: &InFlightRegistry) -> Option<Flushed> {
        #[allow(clippy::expect_used)]
        let mut state = self.state.lock().expect("lock poisoned");
        Self::take_locked(&mut state, registry)
    }

    /// Takes the buffered records only if they still belong to `generation`.
    pub fn take_expired(&self, generation: u64, registry: &InFlightRegistry) -> Option<Flushed> {
        #[allow(clippy::expect_used)]
        let mut state = self.state.lock().expect("lock poisoned");
        if state.generation != generation {
            return None;
        }
        // The caller is the timer itself; forget it rather than abort it.
        state.timer = None;
        Self::take_locked(&mut state, registry)
    }

    fn take_locked(state: &mut PendingBatch, registry: &InFlightRegistry) -> Option<Flushed> {
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        if state.records.is_empty() {
            return None;
        }
        Some(Flushed {
            records: mem::take(&mut state.records),
            guard: registry.register(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        #[allow(clippy::expect_used)]
        let state = self.state.lock().expect("lock poisoned");
        state.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_timer_armed(&self) -> bool {
        #[allow(clippy::expect_used)]
        let state = self.state.lock().expect("lock poisoned");
        state.timer.is_some()
    }
}

// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tracking of outstanding delivery chains.
//!
//! Each chain holds an [`InFlightGuard`] for as long as it runs. Dropping the
//! guard removes the entry, so every exit path of the chain (success,
//! exhausted retries, task abort, panic) leaves the registry consistent.

use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Entries {
    next_id: u64,
    settled: HashMap<u64, CancellationToken>,
}

#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    entries: Arc<Mutex<Entries>>,
}

impl InFlightRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one entry and returns the guard that owns it.
    #[must_use]
    pub fn register(&self) -> InFlightGuard {
        let token = CancellationToken::new();
        #[allow(clippy::expect_used)]
        let mut entries = self.entries.lock().expect("lock poisoned");
        let id = entries.next_id;
        entries.next_id += 1;
        entries.settled.insert(id, token.clone());

        InFlightGuard {
            id,
            entries: Arc::clone(&self.entries),
            token,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        #[allow(clippy::expect_used)]
        let entries = self.entries.lock().expect("lock poisoned");
        entries.settled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves once every entry registered at call time has been removed.
    /// Entries registered afterwards are not waited for.
    pub fn settled(&self) -> impl Future<Output = ()> + Send + 'static {
        let tokens: Vec<CancellationToken> = {
            #[allow(clippy::expect_used)]
            let entries = self.entries.lock().expect("lock poisoned");
            entries.settled.values().cloned().collect()
        };
        async move {
            join_all(tokens.iter().map(CancellationToken::cancelled)).await;
        }
    }
}

/// Ownership of one registry entry; removed exactly once, on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    id: u64,
    entries: Arc<Mutex<Entries>>,
    token: CancellationToken,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // Never panic in drop: recover the map from a poisoned lock.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.settled.remove(&self.id);
        drop(entries);
        self.token.cancel();
    }
}

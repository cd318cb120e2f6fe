// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log records and the payloads they are shipped in.
//!
//! A [`Record`] is an open-ended JSON object. A [`Payload`] is what goes on the
//! wire: one record as a JSON object, or a batch as a JSON array.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub const TIMESTAMP_FIELD: &str = "timestamp";

/// One structured log event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds a record holding a single `message` field.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.insert("message", Value::String(message.into()));
        record
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<u64> {
        self.0.get(TIMESTAMP_FIELD).and_then(Value::as_u64)
    }

    /// Assigns the current time in epoch milliseconds unless the record
    /// already carries a numeric timestamp.
    pub fn ensure_timestamp(&mut self) {
        if self.0.get(TIMESTAMP_FIELD).is_some_and(Value::is_number) {
            return;
        }
        self.0
            .insert(TIMESTAMP_FIELD.to_string(), Value::from(now_millis()));
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    /// Only JSON objects are records; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Body of one delivery chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Single(Record),
    Batch(Vec<Record>),
}

impl Payload {
    #[must_use]
    pub fn record_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(records) => records.len(),
        }
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::Single(record) => vec![record],
            Self::Batch(records) => records,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;

/// A single request/response line from a benchmark log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatencyRecord {
    pub timestamp: NaiveDateTime,
    pub latency_ms: u64,
    pub is_error: bool,
}

/// A network delay injected into the tracked node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayChangeRecord {
    pub timestamp: NaiveDateTime,
    pub delay_ms: u64,
}

/// An adaptive interval reported by a node, tagged with the label of the log
/// it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalRecord {
    pub timestamp: DateTime<Tz>,
    pub node_id: u64,
    pub node_name: String,
    pub interval_ms: u64,
}

/// Offsets in seconds from the first timestamp of a sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct RelativeSeries<T> {
    pub base: T,
    pub offsets: Vec<f64>,
}

// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::record::LatencyRecord;

use serde_derive::Serialize;

/// Summary of one benchmark run's latency records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub count: usize,
    pub errors: usize,
    pub min_ms: u64,
    pub max_ms: u64,
    pub mean_ms: f64,
}

impl RunSummary {
    pub fn new(records: &[LatencyRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::empty("latency summary"));
        }
        let mut errors = 0;
        let mut min = u64::MAX;
        let mut max = 0;
        let mut total = 0.0;
        for record in records {
            if record.is_error {
                errors += 1;
            }
            min = min.min(record.latency_ms);
            max = max.max(record.latency_ms);
            total += record.latency_ms as f64;
        }
        Ok(Self {
            count: records.len(),
            errors,
            min_ms: min,
            max_ms: max,
            mean_ms: total / records.len() as f64,
        })
    }

    /// percentage of requests without the failure marker
    pub fn success_rate(&self) -> f64 {
        100.0 * (self.count - self.errors) as f64 / self.count as f64
    }

    pub fn print(&self, label: &str) {
        info!("-----");
        info!("{}: Requests: {} Errors: {}", label, self.count, self.errors);
        info!("{}: Success: {:.2} %", label, self.success_rate());
        info!(
            "{}: Latency: min: {} ms max: {} ms avg: {:.2} ms",
            label, self.min_ms, self.max_ms, self.mean_ms
        );
    }
}

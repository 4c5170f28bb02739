// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Comparison of basic and adaptive Raft benchmark runs.
//!
//! Benchmark logs are scanned for request latencies, injected network delays
//! and per-node interval updates. The runs are aligned onto relative time
//! axes and rendered as a stacked PNG chart, with an optional JSON export.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod align;
mod analysis;
mod chart;
mod config;
mod config_file;
mod error;
mod extract;
mod logger;
mod reader;
mod record;
mod report;
mod stats;
mod textchart;
mod time;

pub use crate::align::{shared_range, truncate_to_equal_length};
pub use crate::analysis::{Analysis, IntervalPoint, RunSeries, Sources};
pub use crate::chart::render;
pub use crate::config::{Config, NAME, VERSION};
pub use crate::config_file::{NodeLog, Schedule};
pub use crate::error::{Error, Result};
pub use crate::extract::{
    extract_delay_events, extract_interval_events, extract_latency_events, DEFAULT_DELAY_TARGET,
};
pub use crate::logger::Logger;
pub use crate::reader::read_log;
pub use crate::record::*;
pub use crate::report::{export, Report};
pub use crate::stats::RunSummary;
pub use crate::textchart::render_delay_schedule;
pub use crate::time::*;

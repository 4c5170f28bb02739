// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The comparison pipeline: read, extract, normalize and align.

use crate::align::{shared_range, truncate_to_equal_length};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{extract_delay_events, extract_interval_events, extract_latency_events};
use crate::reader::read_log;
use crate::record::{DelayChangeRecord, LatencyRecord, RelativeSeries};
use crate::stats::RunSummary;
use crate::time::{localize_naive, to_relative_seconds, total_seconds, Elapsed};

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;

/// Raw log text for one analysis.
pub struct Sources {
    pub basic: String,
    pub adaptive: String,
    /// `(label, text)` per node interval log, in configuration order
    pub nodes: Vec<(String, String)>,
}

impl Sources {
    pub fn read(config: &Config) -> Result<Self> {
        let basic = read_log(config.basic_log())?;
        let adaptive = read_log(config.adaptive_log())?;
        let nodes = config
            .node_logs()
            .iter()
            .map(|node| Ok((node.name.clone(), read_log(&node.path)?)))
            .collect::<Result<_>>()?;
        Ok(Self {
            basic,
            adaptive,
            nodes,
        })
    }
}

/// One benchmark run after alignment.
#[derive(Clone, Debug)]
pub struct RunSeries {
    pub label: &'static str,
    pub latencies: Vec<LatencyRecord>,
    pub seconds: RelativeSeries<NaiveDateTime>,
    pub delays: Vec<DelayChangeRecord>,
    /// delay change times relative to the first delay change of the run
    pub delay_seconds: Vec<f64>,
    pub summary: RunSummary,
}

impl RunSeries {
    fn new(
        label: &'static str,
        latencies: Vec<LatencyRecord>,
        delays: Vec<DelayChangeRecord>,
    ) -> Result<Self> {
        let times: Vec<NaiveDateTime> = latencies.iter().map(|r| r.timestamp).collect();
        let seconds = to_relative_seconds(&times)?;

        let delay_seconds = if delays.is_empty() {
            Vec::new()
        } else {
            let times: Vec<NaiveDateTime> = delays.iter().map(|r| r.timestamp).collect();
            to_relative_seconds(&times)?.offsets
        };

        let summary = RunSummary::new(&latencies)?;

        Ok(Self {
            label,
            latencies,
            seconds,
            delays,
            delay_seconds,
            summary,
        })
    }

    pub fn latency_values(&self) -> Vec<f64> {
        self.latencies.iter().map(|r| r.latency_ms as f64).collect()
    }

    /// `(relative seconds, delay ms)` for each delay change
    pub fn delay_steps(&self) -> Vec<(f64, u64)> {
        self.delay_seconds
            .iter()
            .copied()
            .zip(self.delays.iter().map(|d| d.delay_ms))
            .collect()
    }
}

/// An interval update placed on the adaptive run's time axis.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalPoint {
    pub node_name: String,
    pub node_id: u64,
    pub timestamp: DateTime<Tz>,
    pub relative_seconds: f64,
    pub interval_ms: u64,
}

#[derive(Clone, Debug)]
pub struct Analysis {
    pub basic: RunSeries,
    pub adaptive: RunSeries,
    /// y range shared by both latency panels
    pub latency_range: (f64, f64),
    pub intervals: Vec<IntervalPoint>,
}

impl Analysis {
    pub fn from_config(config: &Config) -> Result<Self> {
        let sources = Sources::read(config)?;
        Self::from_sources(&sources, config)
            .map_err(|e| name_source(e, config))
    }

    pub fn from_sources(sources: &Sources, config: &Config) -> Result<Self> {
        let target = config.delay_target();

        let basic = extract_latency_events(&sources.basic)?;
        let adaptive = extract_latency_events(&sources.adaptive)?;
        let basic_delays = extract_delay_events(&sources.basic, target)?;
        let adaptive_delays = extract_delay_events(&sources.adaptive, target)?;

        info!(
            "basic: {} requests, {} delay changes",
            basic.len(),
            basic_delays.len()
        );
        info!(
            "adaptive: {} requests, {} delay changes",
            adaptive.len(),
            adaptive_delays.len()
        );

        if basic.is_empty() {
            return Err(Error::empty("basic"));
        }
        if adaptive.is_empty() {
            return Err(Error::empty("adaptive"));
        }

        if basic.len() != adaptive.len() {
            warn!(
                "aligning runs to {} requests, dropping {} trailing basic and {} trailing adaptive requests",
                basic.len().min(adaptive.len()),
                basic.len().saturating_sub(adaptive.len()),
                adaptive.len().saturating_sub(basic.len()),
            );
        }
        let (basic, adaptive) = truncate_to_equal_length(basic, adaptive);

        let basic = RunSeries::new("basic", basic, basic_delays)?;
        let adaptive = RunSeries::new("adaptive", adaptive, adaptive_delays)?;

        let latency_range = shared_range(
            &basic.latency_values(),
            &adaptive.latency_values(),
            config.margin(),
        )?;

        let zone = config.zone();
        let base = localize_naive(&adaptive.seconds.base, &zone);

        let mut intervals = Vec::new();
        for (name, text) in &sources.nodes {
            let records = extract_interval_events(text, name, &zone)?;
            if records.is_empty() {
                warn!("no interval updates found for {}", name);
            }
            debug!("{}: {} interval updates", name, records.len());
            intervals.extend(records.into_iter().map(|r| IntervalPoint {
                relative_seconds: total_seconds(r.timestamp.since(&base)),
                node_name: r.node_name,
                node_id: r.node_id,
                timestamp: r.timestamp,
                interval_ms: r.interval_ms,
            }));
        }

        Ok(Self {
            basic,
            adaptive,
            latency_range,
            intervals,
        })
    }

    /// Node labels in the order their first interval update appears.
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for point in &self.intervals {
            if !names.contains(&point.node_name.as_str()) {
                names.push(&point.node_name);
            }
        }
        names
    }

    pub fn print(&self) {
        self.basic.summary.print("Basic");
        self.adaptive.summary.print("Adaptive");
        info!("-----");
        info!(
            "Latency range: {:.2} ms .. {:.2} ms",
            self.latency_range.0, self.latency_range.1
        );
        for name in self.node_names() {
            let count = self
                .intervals
                .iter()
                .filter(|p| p.node_name == name)
                .count();
            info!("Intervals: {}: {} updates", name, count);
        }
    }
}

// replace the run label with the log path it came from
fn name_source(error: Error, config: &Config) -> Error {
    match error {
        Error::EmptyInput(ref what) if what == "basic" => Error::EmptyInput(format!(
            "basic benchmark log {}",
            config.basic_log()
        )),
        Error::EmptyInput(ref what) if what == "adaptive" => Error::EmptyInput(format!(
            "adaptive benchmark log {}",
            config.adaptive_log()
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
2024-01-01 10:00:00 - 🔧 Applying delay: 20ms to node_three
Req: 2024-01-01 10:00:00.000000N | Res: 2024-01-01 10:00:00.030000N | 30ms | ✅
Req: 2024-01-01 10:00:01.000000N | Res: 2024-01-01 10:00:01.050000N | 50ms | ✅
2024-01-01 10:00:10.5 — 🔧 Applying delay: 78ms to node_three
Req: 2024-01-01 10:00:02.000000N | Res: timeout | 900ms | ❌
Req: 2024-01-01 10:00:03.000000N | Res: 2024-01-01 10:00:03.020000N | 20ms | ✅
";

    const ADAPTIVE: &str = "\
Req: 2025-04-19 16:00:00.000000N | Res: 2025-04-19 16:00:00.010000N | 10ms | ✅
Req: 2025-04-19 16:00:00.500000N | Res: 2025-04-19 16:00:00.540000N | 40ms | ✅
";

    const NODE: &str = "\
[2025-04-19 16:00:05 EEST] Interval update for Node: 50 → 830
[2025-04-19 13:00:10 UTC] Interval update for Node: 50 → 845
";

    fn sources(nodes: Vec<(String, String)>) -> Sources {
        Sources {
            basic: BASIC.to_string(),
            adaptive: ADAPTIVE.to_string(),
            nodes,
        }
    }

    #[test]
    fn aligns_runs_by_index() {
        let analysis = Analysis::from_sources(&sources(Vec::new()), &Config::default()).unwrap();
        assert_eq!(analysis.basic.latencies.len(), 2);
        assert_eq!(analysis.adaptive.latencies.len(), 2);
        assert_eq!(analysis.basic.seconds.offsets, vec![0.0, 1.0]);
        assert_eq!(analysis.adaptive.seconds.offsets, vec![0.0, 0.5]);
        assert_eq!(analysis.basic.latency_values(), vec![30.0, 50.0]);
        assert!((analysis.basic.summary.mean_ms - 40.0).abs() < 1e-9);
        assert_eq!(analysis.basic.summary.errors, 0);

        // 10..50 with a 5% margin
        let (lo, hi) = analysis.latency_range;
        assert!((lo - 8.0).abs() < 1e-9);
        assert!((hi - 52.0).abs() < 1e-9);
        assert!(analysis.intervals.is_empty());
    }

    #[test]
    fn delay_steps_are_relative_to_first_change() {
        let analysis = Analysis::from_sources(&sources(Vec::new()), &Config::default()).unwrap();
        assert_eq!(analysis.basic.delay_steps(), vec![(0.0, 20), (10.5, 78)]);
        assert!(analysis.adaptive.delay_steps().is_empty());
    }

    #[test]
    fn intervals_use_adaptive_base() {
        let nodes = vec![
            ("node_one".to_string(), NODE.to_string()),
            ("node_three".to_string(), String::new()),
        ];
        let analysis = Analysis::from_sources(&sources(nodes), &Config::default()).unwrap();
        assert_eq!(analysis.intervals.len(), 2);
        assert_eq!(analysis.intervals[0].relative_seconds, 5.0);
        assert_eq!(analysis.intervals[1].relative_seconds, 10.0);
        assert_eq!(analysis.intervals[1].interval_ms, 845);
        assert_eq!(analysis.node_names(), vec!["node_one"]);
    }

    #[test]
    fn empty_run_is_fatal() {
        let sources = Sources {
            basic: BASIC.to_string(),
            adaptive: "no requests here".to_string(),
            nodes: Vec::new(),
        };
        match Analysis::from_sources(&sources, &Config::default()) {
            Err(Error::EmptyInput(what)) => assert_eq!(what, "adaptive"),
            other => panic!("expected EmptyInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_run_names_log_path() {
        let config = Config::default();
        let error = name_source(Error::empty("basic"), &config);
        assert_eq!(
            error.to_string(),
            "no events found in basic benchmark log raft_benchmark_basic.log"
        );
    }
}

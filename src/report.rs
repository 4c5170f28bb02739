// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! JSON export of the aligned analysis.

use crate::analysis::{Analysis, RunSeries};
use crate::error::{Error, Result};
use crate::stats::RunSummary;

use serde_derive::Serialize;

use std::path::Path;

#[derive(Serialize)]
pub struct Report<'a> {
    pub basic: RunReport<'a>,
    pub adaptive: RunReport<'a>,
    pub latency_range: [f64; 2],
    pub intervals: Vec<IntervalReport<'a>>,
}

#[derive(Serialize)]
pub struct RunReport<'a> {
    pub base: String,
    pub seconds: &'a [f64],
    pub latency_ms: Vec<u64>,
    pub is_error: Vec<bool>,
    pub delay_steps: Vec<DelayStep>,
    pub summary: &'a RunSummary,
}

#[derive(Serialize)]
pub struct DelayStep {
    pub seconds: f64,
    pub delay_ms: u64,
}

#[derive(Serialize)]
pub struct IntervalReport<'a> {
    pub node_name: &'a str,
    pub node_id: u64,
    pub timestamp: String,
    pub relative_seconds: f64,
    pub interval_ms: u64,
}

impl<'a> RunReport<'a> {
    fn new(run: &'a RunSeries) -> Self {
        Self {
            base: run.seconds.base.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            seconds: &run.seconds.offsets,
            latency_ms: run.latencies.iter().map(|r| r.latency_ms).collect(),
            is_error: run.latencies.iter().map(|r| r.is_error).collect(),
            delay_steps: run
                .delay_steps()
                .into_iter()
                .map(|(seconds, delay_ms)| DelayStep { seconds, delay_ms })
                .collect(),
            summary: &run.summary,
        }
    }
}

impl<'a> Report<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            basic: RunReport::new(&analysis.basic),
            adaptive: RunReport::new(&analysis.adaptive),
            latency_range: [analysis.latency_range.0, analysis.latency_range.1],
            intervals: analysis
                .intervals
                .iter()
                .map(|p| IntervalReport {
                    node_name: &p.node_name,
                    node_id: p.node_id,
                    timestamp: p.timestamp.to_rfc3339(),
                    relative_seconds: p.relative_seconds,
                    interval_ms: p.interval_ms,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write `analysis` to `path` as pretty printed JSON.
pub fn export(analysis: &Analysis, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let export_error = |reason: String| Error::Export {
        path: path.to_path_buf(),
        reason,
    };

    let json = Report::new(analysis)
        .to_json()
        .map_err(|e| export_error(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| export_error(e.to_string()))?;

    info!("Report exported to '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Sources;
    use crate::config::Config;

    fn analysis() -> Analysis {
        let sources = Sources {
            basic: "\
2024-01-01 10:00:00 - 🔧 Applying delay: 20ms to node_three
Req: 2024-01-01 10:00:00.000000N | Res: 2024-01-01 10:00:00.030000N | 30ms | ✅
Req: 2024-01-01 10:00:01.000000N | Res: timeout | 900ms | ❌
"
            .to_string(),
            adaptive: "\
Req: 2024-01-01 11:00:00.000000N | Res: 2024-01-01 11:00:00.010000N | 10ms | ✅
Req: 2024-01-01 11:00:00.500000N | Res: 2024-01-01 11:00:00.540000N | 40ms | ✅
"
            .to_string(),
            nodes: vec![(
                "node_one".to_string(),
                "[2024-01-01 11:00:02] Interval update for Node: 50 → 830\n".to_string(),
            )],
        };
        Analysis::from_sources(&sources, &Config::default()).unwrap()
    }

    #[test]
    fn report_contents() {
        let analysis = analysis();
        let value: serde_json::Value =
            serde_json::from_str(&Report::new(&analysis).to_json().unwrap()).unwrap();

        assert_eq!(value["basic"]["base"], "2024-01-01 10:00:00.000000");
        assert_eq!(value["basic"]["latency_ms"], serde_json::json!([30, 900]));
        assert_eq!(value["basic"]["is_error"], serde_json::json!([false, true]));
        assert_eq!(value["basic"]["summary"]["errors"], 1);
        assert_eq!(value["basic"]["delay_steps"][0]["delay_ms"], 20);
        assert_eq!(value["adaptive"]["seconds"], serde_json::json!([0.0, 0.5]));
        assert!(value["adaptive"]["delay_steps"].as_array().unwrap().is_empty());
        assert_eq!(value["intervals"][0]["node_name"], "node_one");
        assert_eq!(value["intervals"][0]["relative_seconds"], 2.0);
        assert_eq!(
            value["intervals"][0]["timestamp"],
            "2024-01-01T11:00:02+02:00"
        );
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");
        assert!(matches!(
            export(&analysis(), &path),
            Err(Error::Export { .. })
        ));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export(&analysis(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"latency_range\""));
    }
}

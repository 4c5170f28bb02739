// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use log::Level;
use serde_derive::*;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) general: General,
    #[serde(default)]
    pub(crate) logs: Logs,
    #[serde(default)]
    pub(crate) delay: Delay,
    #[serde(default)]
    pub(crate) chart: Chart,
    #[serde(default)]
    pub(crate) schedule: Schedule,
}

impl ConfigFile {
    pub fn general(&self) -> &General {
        &self.general
    }

    pub fn logs(&self) -> &Logs {
        &self.logs
    }

    pub fn delay(&self) -> &Delay {
        &self.delay
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

fn default_logging_level() -> Level {
    Level::Info
}

fn default_timezone() -> String {
    "Europe/Kyiv".to_string()
}

fn default_margin() -> f64 {
    0.05
}

#[derive(Clone, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
#[serde(remote = "Level")]
#[serde(deny_unknown_fields)]
enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct General {
    #[serde(with = "LevelDef")]
    #[serde(default = "default_logging_level")]
    pub(crate) logging: Level,
    #[serde(default = "default_timezone")]
    pub(crate) timezone: String,
    #[serde(default = "default_margin")]
    pub(crate) margin: f64,
    pub(crate) export: Option<String>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            logging: default_logging_level(),
            timezone: default_timezone(),
            margin: default_margin(),
            export: None,
        }
    }
}

impl General {
    pub fn logging(&self) -> Level {
        self.logging
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// fraction of the latency span added above and below the shared y range
    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn export(&self) -> Option<&str> {
        self.export.as_deref()
    }
}

fn default_basic_log() -> String {
    "raft_benchmark_basic.log".to_string()
}

fn default_adaptive_log() -> String {
    "./results/raft_benchmark_x.log".to_string()
}

fn default_node_logs() -> Vec<NodeLog> {
    vec![
        NodeLog {
            name: "node_one".to_string(),
            path: "./results/node_50.log".to_string(),
        },
        NodeLog {
            name: "node_three".to_string(),
            path: "./results/node_52.log".to_string(),
        },
    ]
}

#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Logs {
    #[serde(default = "default_basic_log")]
    pub(crate) basic: String,
    #[serde(default = "default_adaptive_log")]
    pub(crate) adaptive: String,
    #[serde(default = "default_node_logs")]
    pub(crate) node: Vec<NodeLog>,
}

impl Default for Logs {
    fn default() -> Self {
        Self {
            basic: default_basic_log(),
            adaptive: default_adaptive_log(),
            node: default_node_logs(),
        }
    }
}

impl Logs {
    pub fn basic(&self) -> &str {
        &self.basic
    }

    pub fn adaptive(&self) -> &str {
        &self.adaptive
    }

    pub fn nodes(&self) -> &[NodeLog] {
        &self.node
    }
}

/// A per-node interval log and the label it is plotted under.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NodeLog {
    pub name: String,
    pub path: String,
}

fn default_delay_target() -> String {
    crate::extract::DEFAULT_DELAY_TARGET.to_string()
}

fn default_jitter_ms() -> u64 {
    40
}

#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Delay {
    #[serde(default = "default_delay_target")]
    pub(crate) target: String,
    #[serde(default = "default_jitter_ms")]
    pub(crate) jitter_ms: u64,
}

impl Default for Delay {
    fn default() -> Self {
        Self {
            target: default_delay_target(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

impl Delay {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn jitter_ms(&self) -> u64 {
        self.jitter_ms
    }
}

fn default_output() -> String {
    "raft_benchmark_results.png".to_string()
}

fn default_width() -> u32 {
    1600
}

fn default_height() -> u32 {
    1400
}

#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Chart {
    #[serde(default = "default_output")]
    pub(crate) output: String,
    #[serde(default = "default_width")]
    pub(crate) width: u32,
    #[serde(default = "default_height")]
    pub(crate) height: u32,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            output: default_output(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Chart {
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn default_schedule_node() -> String {
    crate::extract::DEFAULT_DELAY_TARGET.to_string()
}

fn default_schedule_times() -> Vec<u64> {
    (0..=120).step_by(10).collect()
}

fn default_schedule_delays() -> Vec<u64> {
    vec![20, 78, 136, 195, 253, 311, 370, 311, 253, 195, 136, 78, 20]
}

fn default_max_bar_length() -> usize {
    25
}

/// The delay schedule printed by `delay-chart`.
#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    #[serde(default = "default_schedule_node")]
    pub(crate) node: String,
    #[serde(default = "default_schedule_times")]
    pub(crate) times: Vec<u64>,
    #[serde(default = "default_schedule_delays")]
    pub(crate) delays: Vec<u64>,
    #[serde(default = "default_max_bar_length")]
    pub(crate) max_bar_length: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            node: default_schedule_node(),
            times: default_schedule_times(),
            delays: default_schedule_delays(),
            max_bar_length: default_max_bar_length(),
        }
    }
}

impl Schedule {
    pub fn node(&self) -> &str {
        &self.node
    }

    /// seconds since the schedule started
    pub fn times(&self) -> &[u64] {
        &self.times
    }

    /// delay in milliseconds at each point in `times`
    pub fn delays(&self) -> &[u64] {
        &self.delays
    }

    pub fn max_bar_length(&self) -> usize {
        self.max_bar_length
    }
}

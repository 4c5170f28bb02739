// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config_file::*;
use crate::error::{Error, Result};
use crate::logger::verbosity;
use crate::time::parse_zone;

use chrono_tz::Tz;
use clap::{App, Arg, ArgMatches};
use log::Level;

use std::process;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Effective configuration: the TOML file (or builtin defaults) with command
/// line overrides applied.
#[derive(Clone, Debug)]
pub struct Config {
    file: ConfigFile,
    zone: Tz,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: ConfigFile::default(),
            zone: chrono_tz::Europe::Kyiv,
        }
    }
}

fn common_args<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
    app.version(VERSION)
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Increase verbosity by one level. Can be used more than once")
                .multiple(true),
        )
}

/// Command line of `raft-bench-chart`.
pub fn chart_app<'a, 'b>() -> App<'a, 'b> {
    common_args(App::new("raft-bench-chart"))
        .about("Compare basic and adaptive Raft benchmark logs")
        .arg(
            Arg::with_name("basic")
                .long("basic")
                .value_name("FILE")
                .help("Benchmark log of the basic Raft run")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("adaptive")
                .long("adaptive")
                .value_name("FILE")
                .help("Benchmark log of the adaptive Raft run")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("node")
                .long("node")
                .value_name("NAME=FILE")
                .help("Interval log of a node, replaces the configured node logs")
                .multiple(true)
                .number_of_values(1)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no-intervals")
                .long("no-intervals")
                .help("Skip node interval logs and render two panels")
                .conflicts_with("node"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .value_name("FILE")
                .help("PNG file to render the comparison into")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("export")
                .long("export")
                .value_name("FILE")
                .help("Write the aligned series as JSON")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timezone")
                .long("timezone")
                .value_name("ZONE")
                .help("Zone that naive interval timestamps are read in")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("delay-target")
                .long("delay-target")
                .value_name("NODE")
                .help("Node whose injected delay is plotted")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("jitter")
                .long("jitter")
                .value_name("Milliseconds")
                .help("Half width of the band drawn around the injected delay")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("margin")
                .long("margin")
                .value_name("FRACTION")
                .help("Padding added above and below the shared latency range")
                .allow_hyphen_values(true)
                .takes_value(true),
        )
}

/// Command line of `delay-chart`.
pub fn delay_chart_app<'a, 'b>() -> App<'a, 'b> {
    common_args(App::new("delay-chart"))
        .about("Print the injected delay schedule as a text bar chart")
        .arg(
            Arg::with_name("bar-length")
                .long("bar-length")
                .value_name("CHARS")
                .help("Length of the bar for the largest delay")
                .takes_value(true),
        )
}

impl Config {
    /// parse the `raft-bench-chart` command line and return `Config`
    pub fn new() -> Config {
        Self::from_matches(&chart_app().get_matches()).unwrap_or_else(|e| {
            println!("ERROR: {}", e);
            process::exit(1);
        })
    }

    /// parse the `delay-chart` command line and return `Config`
    pub fn for_delay_chart() -> Config {
        Self::from_matches(&delay_chart_app().get_matches()).unwrap_or_else(|e| {
            println!("ERROR: {}", e);
            process::exit(1);
        })
    }

    /// Build a config from parsed arguments of either command line.
    pub fn from_matches(matches: &ArgMatches) -> Result<Config> {
        let mut file = if let Some(path) = matches.value_of("config") {
            Self::load_file(path)?
        } else {
            ConfigFile::default()
        };

        if let Some(basic) = matches.value_of("basic") {
            file.logs.basic = basic.to_string();
        }

        if let Some(adaptive) = matches.value_of("adaptive") {
            file.logs.adaptive = adaptive.to_string();
        }

        if let Some(nodes) = matches.values_of("node") {
            file.logs.node = nodes.map(parse_node_arg).collect::<Result<_>>()?;
        }

        if matches.is_present("no-intervals") {
            file.logs.node.clear();
        }

        if let Some(output) = matches.value_of("output") {
            file.chart.output = output.to_string();
        }

        if let Some(export) = matches.value_of("export") {
            file.general.export = Some(export.to_string());
        }

        if let Some(timezone) = matches.value_of("timezone") {
            file.general.timezone = timezone.to_string();
        }

        if let Some(target) = matches.value_of("delay-target") {
            file.delay.target = target.to_string();
        }

        if let Some(jitter) = parse_arg(matches, "jitter")? {
            file.delay.jitter_ms = jitter;
        }

        if let Some(margin) = parse_arg(matches, "margin")? {
            file.general.margin = margin;
        }

        if let Some(length) = parse_arg(matches, "bar-length")? {
            file.schedule.max_bar_length = length;
        }

        file.general.logging = verbosity(file.general.logging, matches.occurrences_of("verbose"));

        Self::from_file(file)
    }

    /// Validate a parsed config file.
    pub fn from_file(file: ConfigFile) -> Result<Config> {
        let zone = parse_zone(file.general.timezone())?;

        let margin = file.general.margin();
        if !margin.is_finite() || margin < 0.0 {
            return Err(Error::Config(format!(
                "margin must be a non-negative fraction, got {}",
                margin
            )));
        }

        let (width, height) = file.chart.size();
        if width == 0 || height == 0 {
            return Err(Error::Config("chart size must be non-zero".to_string()));
        }

        if file.delay.target().is_empty() {
            return Err(Error::Config("delay target node is empty".to_string()));
        }

        for node in file.logs.nodes() {
            if node.name.is_empty() {
                return Err(Error::Config(format!("node log {} has no name", node.path)));
            }
        }

        Ok(Config { file, zone })
    }

    pub fn load_from_str(content: &str) -> Result<Config> {
        let file = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse TOML config: {}", e)))?;
        Self::from_file(file)
    }

    fn load_file(path: &str) -> Result<ConfigFile> {
        let content = crate::reader::read_log(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse TOML config {}: {}", path, e)))
    }

    pub fn logging(&self) -> Level {
        self.file.general().logging()
    }

    /// zone interval timestamps are normalized into
    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn margin(&self) -> f64 {
        self.file.general().margin()
    }

    pub fn export(&self) -> Option<&str> {
        self.file.general().export()
    }

    pub fn basic_log(&self) -> &str {
        self.file.logs().basic()
    }

    pub fn adaptive_log(&self) -> &str {
        self.file.logs().adaptive()
    }

    pub fn node_logs(&self) -> &[NodeLog] {
        self.file.logs().nodes()
    }

    pub fn delay_target(&self) -> &str {
        self.file.delay().target()
    }

    pub fn jitter_ms(&self) -> u64 {
        self.file.delay().jitter_ms()
    }

    pub fn output(&self) -> &str {
        self.file.chart().output()
    }

    pub fn size(&self) -> (u32, u32) {
        self.file.chart().size()
    }

    pub fn schedule(&self) -> &Schedule {
        self.file.schedule()
    }

    pub fn print(&self) {
        info!("-----");
        info!("Config: Basic: {}", self.basic_log());
        info!("Config: Adaptive: {}", self.adaptive_log());
        for node in self.node_logs() {
            info!("Config: Node: {} Log: {}", node.name, node.path);
        }
        info!(
            "Config: Delay Target: {} Jitter: {} ms",
            self.delay_target(),
            self.jitter_ms()
        );
        info!(
            "Config: Timezone: {} Margin: {}",
            self.zone.name(),
            self.margin()
        );
        let (width, height) = self.size();
        info!("Config: Output: {} ({}x{})", self.output(), width, height);
        if let Some(export) = self.export() {
            info!("Config: Export: {}", export);
        }
    }
}

fn parse_node_arg(value: &str) -> Result<NodeLog> {
    let mut parts = value.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(name), Some(path)) if !name.is_empty() && !path.is_empty() => Ok(NodeLog {
            name: name.to_string(),
            path: path.to_string(),
        }),
        _ => Err(Error::Config(format!(
            "node log must be NAME=FILE, got {:?}",
            value
        ))),
    }
}

/// a helper function to parse an argument by name from `ArgMatches`
fn parse_arg<T>(matches: &ArgMatches, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    matches
        .value_of(key)
        .map(|v| {
            v.parse()
                .map_err(|e| Error::Config(format!("could not parse {}: {}", key, e)))
        })
        .transpose()
}

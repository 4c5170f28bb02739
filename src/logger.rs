// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use log::{Level, Metadata, Record, SetLoggerError};

/// Stdout backend for the `log` facade.
///
/// Lines look like `2025-04-19 16:19:56.123 INFO  [raft_bench] message`. Records
/// at debug and below carry their module target instead of the label.
pub struct Logger {
    label: Option<&'static str>,
    level: Level,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Logger {
        Logger {
            label: None,
            level: Level::Info,
        }
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn init(self) -> Result<(), SetLoggerError> {
        let filter = self.level.to_level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }

    fn format(&self, record: &Record) -> String {
        let target = if record.level() >= Level::Debug {
            record.target()
        } else {
            self.label.unwrap_or_else(|| record.target())
        };
        format!(
            "{} {:<5} [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            target,
            record.args()
        )
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", self.format(record));
        }
    }

    fn flush(&self) {}
}

/// Map the stacking `-v` count onto a level, starting from `base`.
pub fn verbosity(base: Level, occurrences: u64) -> Level {
    match (base as u64).saturating_add(occurrences) {
        0 | 1 => Level::Error,
        2 => Level::Warn,
        3 => Level::Info,
        4 => Level::Debug,
        _ => Level::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_stacks_from_base() {
        assert_eq!(verbosity(Level::Info, 0), Level::Info);
        assert_eq!(verbosity(Level::Info, 1), Level::Debug);
        assert_eq!(verbosity(Level::Info, 5), Level::Trace);
        assert_eq!(verbosity(Level::Error, 1), Level::Warn);
    }

    #[test]
    fn label_used_for_info_and_target_for_debug() {
        let logger = Logger::new().label("raft_bench").level(Level::Trace);
        let info = logger.format(
            &Record::builder()
                .level(Level::Info)
                .target("raft_bench_analysis::analysis")
                .args(format_args!("hello"))
                .build(),
        );
        assert!(info.ends_with("INFO  [raft_bench] hello"), "{}", info);

        let debug = logger.format(
            &Record::builder()
                .level(Level::Debug)
                .target("raft_bench_analysis::reader")
                .args(format_args!("read"))
                .build(),
        );
        assert!(debug.ends_with("[raft_bench_analysis::reader] read"), "{}", debug);
    }
}
